//! Extension dictionary pointer: `(102, "{ACAD_XDICTIONARY") (360, handle) (102, "}")`

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{ACAD_XDICTIONARY, APP_DATA_MARKER, XDICT_HANDLE_CODE};
use crate::io::dxf::writer::DxfStreamWriter;
use crate::io::dxf::{DxfValue, Tags};
use crate::types::Handle;

/// Link to the DICTIONARY exclusively owned by an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDict {
    handle: Handle,
}

impl ExtensionDict {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn from_tags(tags: &Tags) -> Result<Self> {
        let valid = tags.len() == 3
            && tags[0].is(APP_DATA_MARKER, ACAD_XDICTIONARY)
            && tags[1].code == XDICT_HANDLE_CODE
            && tags[2].code == APP_DATA_MARKER;
        match (&tags.get(1).map(|tag| &tag.value), valid) {
            (Some(DxfValue::Handle(handle)), true) => Ok(Self::new(*handle)),
            _ => Err(DxfError::StructureError(
                "Invalid extension dictionary structure.".to_string(),
            )),
        }
    }

    /// Handle of the DICTIONARY object
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        writer.write_string(APP_DATA_MARKER, ACAD_XDICTIONARY)?;
        writer.write_handle(XDICT_HANDLE_CODE, self.handle)?;
        writer.write_string(APP_DATA_MARKER, "}")
    }
}
