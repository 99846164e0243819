//! Diagnostic: load DXF files and report what the entity layer made of them.
//!
//! Usage:
//!   cargo run --bin dxf_tags -- [--failsafe] [--round-trip] <file.dxf>...
//!
//! Files are processed in parallel. `--round-trip` writes each document back
//! to tags and compares them with a second load of that output.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use dxf_records::io::dxf::TagCollector;
use dxf_records::{DxfDocument, DxfReaderConfiguration, DxfWriterConfiguration};

struct Options {
    failsafe: bool,
    round_trip: bool,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        failsafe: false,
        round_trip: false,
        files: Vec::new(),
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--failsafe" => options.failsafe = true,
            "--round-trip" => options.round_trip = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => options.files.push(PathBuf::from(arg)),
        }
    }
    if options.files.is_empty() {
        bail!("usage: dxf_tags [--failsafe] [--round-trip] <file.dxf>...");
    }
    Ok(options)
}

fn report(path: &Path, options: &Options) -> Result<String> {
    let config = DxfReaderConfiguration {
        failsafe: options.failsafe,
        log_unprocessed_tags: false,
        ..Default::default()
    };
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let doc = DxfDocument::read(file, &config).with_context(|| format!("load {}", path.display()))?;

    let mut types: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unprocessed = 0;
    for (_, entity) in doc.entitydb.iter() {
        *types.entry(entity.dxftype()).or_default() += 1;
        if entity.has_unprocessed_tags() {
            unprocessed += 1;
        }
    }

    let mut lines = vec![format!(
        "{}: {} ({}), {} entities, {} with unprocessed tags",
        path.display(),
        doc.version.as_str(),
        doc.version.release(),
        doc.entitydb.len(),
        unprocessed
    )];
    lines.push(format!("  sections: {}", doc.section_names().collect::<Vec<_>>().join(" ")));
    for (dxftype, count) in &types {
        lines.push(format!("  {dxftype:<20} {count}"));
    }
    for notification in &doc.notifications {
        lines.push(format!("  {notification}"));
    }

    if options.round_trip {
        let config = DxfWriterConfiguration::default();
        let mut collector = TagCollector::new();
        doc.export(&mut collector, &config).context("export")?;
        let first = collector.into_tags();
        let reloaded = DxfDocument::load(first.clone().into_iter().map(Ok), &DxfReaderConfiguration::default())
            .context("reload")?;
        let second = reloaded.to_tags(&config).context("export reloaded")?;
        if first == second {
            lines.push(format!("  round trip OK, {} tags", first.len()));
        } else {
            lines.push(format!("  round trip MISMATCH, {} vs {} tags", first.len(), second.len()));
        }
    }
    Ok(lines.join("\n"))
}

fn main() -> Result<()> {
    let options = parse_args()?;
    let reports: Vec<(PathBuf, Result<String>)> = options
        .files
        .par_iter()
        .map(|path| (path.clone(), report(path, &options)))
        .collect();

    let mut failed = 0;
    for (path, result) in reports {
        match result {
            Ok(text) => println!("{text}"),
            Err(err) => {
                failed += 1;
                println!("{}: FAILED {err:#}", path.display());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} file(s) failed");
    }
    Ok(())
}
