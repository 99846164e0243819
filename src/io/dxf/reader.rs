//! DXF text reader: tokenizer, compiler and structure loader pipeline

mod section_reader;
mod stream_reader;
mod tag_compiler;
mod text_reader;

pub use section_reader::{load_dxf_structure, DxfStructure, ENTITY_SECTIONS, KNOWN_SECTIONS};
pub use stream_reader::{DxfCodePair, DxfStreamReader, PairVecReader};
pub use tag_compiler::{decode_hex, TagCompiler};
pub use text_reader::DxfTextReader;

use crate::document::DxfDocument;
use crate::error::Result;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Configuration for the DXF reader.
#[derive(Debug, Clone)]
pub struct DxfReaderConfiguration {
    /// When `true`, entities without the subclass markers their version
    /// requires are loaded with the legacy layout and reported as
    /// notifications instead of aborting the read.
    ///
    /// Default: `false` (strict mode, errors propagate).
    pub failsafe: bool,
    /// Log tags the entity schemas do not know at info level.
    ///
    /// Default: `true`.
    pub log_unprocessed_tags: bool,
    /// Fallback encoding for lines that are not valid UTF-8, `None` means
    /// Latin-1.
    pub encoding: Option<&'static Encoding>,
}

impl Default for DxfReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: false,
            log_unprocessed_tags: true,
            encoding: None,
        }
    }
}

/// DXF file reader
pub struct DxfReader<R: BufRead> {
    reader: R,
    config: DxfReaderConfiguration,
}

impl<R: Read> DxfReader<BufReader<R>> {
    /// Create a new DXF reader from any reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            config: DxfReaderConfiguration::default(),
        }
    }
}

impl DxfReader<BufReader<File>> {
    /// Create a new DXF reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_reader(File::open(path)?))
    }
}

impl<'a> DxfReader<&'a [u8]> {
    /// Create a new DXF reader over DXF text held in memory
    pub fn from_text(text: &'a str) -> Self {
        Self {
            reader: text.as_bytes(),
            config: DxfReaderConfiguration::default(),
        }
    }
}

impl<R: BufRead> DxfReader<R> {
    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Lazy typed tag stream over the input
    pub fn into_tags(self) -> TagCompiler<DxfTextReader<R>> {
        TagCompiler::new(DxfTextReader::new(self.reader).with_encoding(self.config.encoding))
    }

    /// Read the whole stream into a document
    pub fn read(self) -> Result<DxfDocument> {
        let config = self.config.clone();
        DxfDocument::load(self.into_tags(), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = DxfReaderConfiguration::default();
        assert!(!config.failsafe);
        assert!(config.log_unprocessed_tags);
        assert!(config.encoding.is_none());
    }

    #[test]
    fn test_tag_stream() {
        let tags: Vec<_> = DxfReader::from_text("0\nSECTION\n2\nENTITIES\n0\nENDSEC\n0\nEOF\n")
            .into_tags()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(tags.len(), 4);
    }
}
