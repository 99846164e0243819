//! Types without a schema, stored as tags

use once_cell::sync::Lazy;

use super::attributes::DxfAttributes;
use super::common::base_class;
use super::extended_tags::ExtendedTags;
use crate::error::Result;
use crate::io::dxf::group_code::SUBCLASS_MARKER;
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::io::dxf::Tags;

/// Only handle and owner are known
pub static TAG_STORAGE_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| DxfAttributes::new(vec![base_class()]));

/// Subclasses of an unsupported type, markers included
#[derive(Debug, Clone, PartialEq)]
pub struct TagStorage {
    dxftype: String,
    subclasses: Vec<Tags>,
}

impl TagStorage {
    pub fn new(dxftype: impl Into<String>) -> Self {
        Self {
            dxftype: dxftype.into(),
            subclasses: Vec::new(),
        }
    }

    pub fn dxftype(&self) -> &str {
        &self.dxftype
    }

    pub fn subclasses(&self) -> &[Tags] {
        &self.subclasses
    }

    /// Keep all subclasses after the base class; the flat layout has none,
    /// its tags stay with the base class.
    pub(super) fn load(&mut self, xtags: &ExtendedTags, flat: bool) {
        if !flat {
            self.subclasses = xtags.subclasses.iter().skip(1).cloned().collect();
        }
    }

    /// Markers are dropped for R12
    pub(super) fn export_dxf(&self, writer: &mut dyn DxfStreamWriter, markers: bool) -> Result<()> {
        for subclass in &self.subclasses {
            for tag in subclass.iter() {
                if markers || tag.code != SUBCLASS_MARKER {
                    writer.write_tag(tag)?;
                }
            }
        }
        Ok(())
    }
}
