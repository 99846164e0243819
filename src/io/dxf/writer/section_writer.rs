//! DXF section writer
//!
//! Writes the sections of a [`DxfDocument`] in their original order. The
//! HEADER is rebuilt from the document variables, raw section items are
//! written verbatim and bound entities export themselves.

use log::debug;

use crate::document::{strip_markers, DxfDocument, SectionItem, HEADER_SECTION};
use crate::error::Result;
use crate::io::dxf::reader::ENTITY_SECTIONS;
use crate::types::DxfVersion;

use super::stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
use super::DxfWriterConfiguration;

/// Sections R12 does not know
const POST_R12_SECTIONS: [&str; 4] = ["CLASSES", "OBJECTS", "THUMBNAILIMAGE", "ACDSDATA"];

/// Writes all DXF sections
pub struct SectionWriter<'a> {
    writer: &'a mut dyn DxfStreamWriter,
    config: &'a DxfWriterConfiguration,
}

impl<'a> SectionWriter<'a> {
    /// Create a new section writer
    pub fn new(writer: &'a mut dyn DxfStreamWriter, config: &'a DxfWriterConfiguration) -> Self {
        Self { writer, config }
    }

    /// Write all sections and the closing `EOF`
    pub fn write_document(&mut self, document: &DxfDocument) -> Result<()> {
        let version = self.config.target_version();
        for (name, items) in document.sections() {
            if version == DxfVersion::R12 && POST_R12_SECTIONS.contains(&name) {
                debug!("skipped section {} for DXF R12", name);
                continue;
            }
            self.writer.write_section_start(name)?;
            if name == HEADER_SECTION {
                self.write_header(document, version)?;
            } else {
                self.write_items(document, name, items)?;
            }
            self.writer.write_section_end()?;
        }
        self.writer.write_eof()
    }

    /// Write the HEADER variables
    fn write_header(&mut self, document: &DxfDocument, version: DxfVersion) -> Result<()> {
        for (name, tags) in document.export_header(version).iter() {
            self.writer.write_string(9, name)?;
            self.writer.write_tags(tags)?;
        }
        Ok(())
    }

    fn write_items(&mut self, document: &DxfDocument, name: &str, items: &[SectionItem]) -> Result<()> {
        let legacy_target = self.config.target_version() == DxfVersion::R12
            && document.version != DxfVersion::R12
            && ENTITY_SECTIONS.contains(&name);
        for item in items {
            match item {
                SectionItem::Raw(tags) if legacy_target => self.writer.write_tags(&strip_markers(tags))?,
                SectionItem::Raw(tags) => self.writer.write_tags(tags)?,
                SectionItem::Entity(handle) => match document.entitydb.try_get(*handle) {
                    Some(entity) => entity.export_dxf(&mut *self.writer, self.config)?,
                    None => debug!("skipped unbound handle #{} in section {}", handle, name),
                },
            }
        }
        Ok(())
    }
}
