//! DXF writer module

mod section_writer;
mod stream_writer;
mod tag_collector;
mod text_writer;

pub use section_writer::SectionWriter;
pub use stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
pub use tag_collector::TagCollector;
pub use text_writer::{format_double, DxfTextWriter};

use crate::document::DxfDocument;
use crate::error::Result;
use crate::io::dxf::tags::Tags;
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Configuration for exporting entities and documents.
#[derive(Debug, Clone)]
pub struct DxfWriterConfiguration {
    /// Target DXF version, `None` means the document version
    /// (or the latest version for entities exported on their own).
    pub version: Option<DxfVersion>,
    /// Export optional attributes even if they hold their default value.
    pub force_optional: bool,
    /// Write entity handles for R12 targets. Later versions always write them.
    pub write_handles: bool,
}

impl Default for DxfWriterConfiguration {
    fn default() -> Self {
        Self {
            version: None,
            force_optional: false,
            write_handles: true,
        }
    }
}

impl DxfWriterConfiguration {
    /// Configuration targeting a specific version
    pub fn for_version(version: DxfVersion) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }

    /// The version entities are written for
    pub fn target_version(&self) -> DxfVersion {
        self.version.unwrap_or(DxfVersion::LATEST)
    }
}

/// DXF file writer
pub struct DxfWriter<'a> {
    document: &'a DxfDocument,
    config: DxfWriterConfiguration,
}

impl<'a> DxfWriter<'a> {
    /// Create a new DXF writer for ASCII output
    pub fn new(document: &'a DxfDocument) -> Self {
        Self {
            document,
            config: DxfWriterConfiguration::default(),
        }
    }

    /// Set the writer configuration.
    pub fn with_configuration(mut self, config: DxfWriterConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Write to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to_writer(BufWriter::new(file))
    }

    /// Write to any writer
    pub fn write_to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut stream_writer = DxfTextWriter::new(writer);
        self.write_dxf(&mut stream_writer)?;
        stream_writer.flush()
    }

    /// Write to a byte vector (useful for testing)
    pub fn write_to_vec(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_writer(&mut buffer)?;
        Ok(buffer)
    }

    /// Export into typed tags instead of text
    pub fn write_to_tags(&self) -> Result<Tags> {
        let mut collector = TagCollector::new();
        self.write_dxf(&mut collector)?;
        Ok(collector.into_tags())
    }

    /// Write DXF content to a stream writer
    pub fn write_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        let config = DxfWriterConfiguration {
            version: Some(self.config.version.unwrap_or(self.document.version)),
            ..self.config.clone()
        };
        SectionWriter::new(writer, &config).write_document(self.document)
    }
}

/// Convenience function to write a document to a file
pub fn write_dxf<P: AsRef<Path>>(document: &DxfDocument, path: P) -> Result<()> {
    DxfWriter::new(document).write_to_file(path)
}
