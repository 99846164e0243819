//! Shared test utilities for dxf-records integration tests.
//!
//! Builders for DXF text and tag lists, and load helpers that all test
//! crates import via `mod common;`.

#![allow(dead_code)]

use dxf_records::io::dxf::{DxfReaderConfiguration, Tags};
use dxf_records::{DxfDocument, DxfVersion, DxfWriter, DxfWriterConfiguration};

/// Route `log` output through `env_logger`, `RUST_LOG=debug` shows it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// DXF text from `(code, value)` pairs, one line each as in a file
pub fn dxf_text(pairs: &[(i32, &str)]) -> String {
    pairs
        .iter()
        .map(|(code, value)| format!("{:>3}\n{}\n", code, value))
        .collect()
}

/// Compiled tags of DXF text
pub fn tags(text: &str) -> Tags {
    Tags::from_text(text).expect("valid DXF tags")
}

/// A complete DXF file with a HEADER for `version`, the given ENTITIES
/// content and, after R12, the given OBJECTS content.
pub fn document_text(version: DxfVersion, handseed: &str, entities: &str, objects: &str) -> String {
    let mut text = dxf_text(&[
        (0, "SECTION"),
        (2, "HEADER"),
        (9, "$ACADVER"),
        (1, version.as_str()),
        (9, "$HANDSEED"),
        (5, handseed),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
    ]);
    text.push_str(entities);
    text.push_str(&dxf_text(&[(0, "ENDSEC")]));
    if version != DxfVersion::R12 {
        text.push_str(&dxf_text(&[(0, "SECTION"), (2, "OBJECTS")]));
        text.push_str(objects);
        text.push_str(&dxf_text(&[(0, "ENDSEC")]));
    }
    text.push_str(&dxf_text(&[(0, "EOF")]));
    text
}

pub fn strict() -> DxfReaderConfiguration {
    DxfReaderConfiguration {
        log_unprocessed_tags: false,
        ..Default::default()
    }
}

pub fn failsafe() -> DxfReaderConfiguration {
    DxfReaderConfiguration {
        failsafe: true,
        log_unprocessed_tags: false,
        ..Default::default()
    }
}

pub fn load(text: &str) -> DxfDocument {
    DxfDocument::read(text.as_bytes(), &strict()).expect("valid DXF document")
}

/// Export `doc` as DXF text
pub fn export_text(doc: &DxfDocument, config: DxfWriterConfiguration) -> String {
    let bytes = DxfWriter::new(doc)
        .with_configuration(config)
        .write_to_vec()
        .expect("exportable document");
    String::from_utf8(bytes).expect("UTF-8 output")
}

/// A minimal modern LINE from (0,0,0) to (1,0,0)
pub fn line_text(handle: &str, owner: &str) -> String {
    dxf_text(&[
        (0, "LINE"),
        (5, handle),
        (330, owner),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbLine"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "1.0"),
        (21, "0.0"),
        (31, "0.0"),
    ])
}
