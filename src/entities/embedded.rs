//! Embedded objects, `(101, "Embedded Object")` blocks kept verbatim

use crate::error::Result;
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::io::dxf::Tags;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedObjects {
    objects: Vec<Tags>,
}

impl EmbeddedObjects {
    /// Each block starts with its `(101, "Embedded Object")` marker
    pub fn new(objects: Vec<Tags>) -> Self {
        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tags> {
        self.objects.iter()
    }

    pub fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        for tags in &self.objects {
            writer.write_tags(tags)?;
        }
        Ok(())
    }
}
