//! Reactor lists: `(102, "{ACAD_REACTORS") (330, handle)... (102, "}")`

use indexmap::IndexSet;

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{ACAD_REACTORS, APP_DATA_MARKER, REACTOR_HANDLE_CODE};
use crate::io::dxf::writer::DxfStreamWriter;
use crate::io::dxf::{DxfValue, Tags};
use crate::types::Handle;

/// Handles of the objects notified about changes of an entity
///
/// Insertion order is kept for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactors {
    handles: IndexSet<Handle>,
}

impl Reactors {
    pub fn new<I: IntoIterator<Item = Handle>>(handles: I) -> Self {
        Self {
            handles: handles.into_iter().collect(),
        }
    }

    /// Load from a bracketed application data block
    pub fn from_tags(tags: &Tags) -> Result<Self> {
        let opened = tags.first().map_or(false, |tag| tag.is(APP_DATA_MARKER, ACAD_REACTORS));
        let closed = tags.len() > 1 && tags.last().map_or(false, |tag| tag.code == APP_DATA_MARKER);
        if !opened || !closed {
            return Err(DxfError::StructureError("Invalid reactors structure.".to_string()));
        }
        let mut handles = IndexSet::new();
        for tag in &tags[1..tags.len() - 1] {
            match (&tag.value, tag.code) {
                (DxfValue::Handle(handle), REACTOR_HANDLE_CODE) => {
                    handles.insert(*handle);
                }
                _ => {
                    return Err(DxfError::StructureError(format!(
                        "Unexpected tag {} in reactors structure.",
                        tag
                    )))
                }
            }
        }
        Ok(Self { handles })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn has(&self, handle: Handle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn add(&mut self, handle: Handle) {
        self.handles.insert(handle);
    }

    /// Remove `handle`, a no-op if absent
    pub fn discard(&mut self, handle: Handle) {
        self.handles.shift_remove(&handle);
    }

    pub fn get(&self) -> Vec<Handle> {
        self.handles.iter().copied().collect()
    }

    /// Replace all reactor handles
    pub fn set<I: IntoIterator<Item = Handle>>(&mut self, handles: I) {
        self.handles = handles.into_iter().collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles.iter().copied()
    }

    pub fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        writer.write_string(APP_DATA_MARKER, ACAD_REACTORS)?;
        for handle in &self.handles {
            writer.write_handle(REACTOR_HANDLE_CODE, *handle)?;
        }
        writer.write_string(APP_DATA_MARKER, "}")
    }
}
