//! XRECORD object: arbitrary tags stored after the `AcDbXrecord` marker

use once_cell::sync::Lazy;

use crate::entities::attributes::{DefSubclass, DxfAttr, DxfAttributes};
use crate::entities::common::base_class;
use crate::entities::{DxfEntity, DxfNamespace, EntityKind};
use crate::error::{DxfError, Result};
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::io::dxf::group_code::SUBCLASS_MARKER;
use crate::io::dxf::{Tag, Tags};

/// Group code of the cloning flag
const CLONING_CODE: i32 = 280;

pub static XRECORD_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        DefSubclass::new(
            Some("AcDbXrecord"),
            vec![DxfAttr::int("cloning", CLONING_CODE).default(1)],
        ),
    ])
});

/// Duplicate record cloning flags of DICTIONARY and XRECORD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictionaryCloningFlags {
    #[default]
    NotApplicable = 0,
    KeepExisting = 1,
    UseClone = 2,
    XrefName = 3,
    Name = 4,
    UnmangleName = 5,
}

impl DictionaryCloningFlags {
    pub fn from_value(value: i64) -> Self {
        match value {
            1 => DictionaryCloningFlags::KeepExisting,
            2 => DictionaryCloningFlags::UseClone,
            3 => DictionaryCloningFlags::XrefName,
            4 => DictionaryCloningFlags::Name,
            5 => DictionaryCloningFlags::UnmangleName,
            _ => DictionaryCloningFlags::NotApplicable,
        }
    }

    pub fn to_value(self) -> i64 {
        self as i64
    }
}

/// User tags of an XRECORD, kept in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XRecordData {
    tags: Tags,
}

impl XRecordData {
    /// Load the `AcDbXrecord` subclass.
    ///
    /// Only a 280 directly behind the marker is the cloning flag, every
    /// other tag is user data and kept in order.
    pub(crate) fn load(&mut self, ns: &mut DxfNamespace, subclass: &Tags) {
        let mut tags = subclass.iter().skip_while(|tag| tag.code == SUBCLASS_MARKER).peekable();
        if let Some(cloning) = tags.next_if(|tag| tag.code == CLONING_CODE && tag.value.as_int().is_some()) {
            ns.unprotected_set("cloning", cloning.value.clone());
        }
        self.tags = tags.cloned().collect();
    }

    pub(crate) fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        writer.write_tags(&self.tags)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn set_tags<I: IntoIterator<Item = Tag>>(&mut self, tags: I) -> Result<()> {
        let tags: Tags = tags.into_iter().collect();
        // structure tags would end the object on reload
        if let Some(tag) = tags.iter().find(|tag| tag.code == 0 || tag.code == 100) {
            return Err(DxfError::StructureError(format!("Invalid tag {} in XRECORD", tag)));
        }
        self.tags = tags;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

impl DxfEntity {
    pub fn new_xrecord() -> Self {
        DxfEntity::new(EntityKind::XRecord(XRecordData::default()))
    }

    pub fn xrecord(&self) -> Option<&XRecordData> {
        match self.kind() {
            EntityKind::XRecord(data) => Some(data),
            _ => None,
        }
    }

    pub fn xrecord_mut(&mut self) -> Option<&mut XRecordData> {
        match self.kind_mut() {
            EntityKind::XRecord(data) => Some(data),
            _ => None,
        }
    }

    /// Cloning flags of a DICTIONARY or XRECORD
    pub fn cloning_flags(&self) -> Result<DictionaryCloningFlags> {
        let value = self.get("cloning")?.and_then(|value| value.as_int()).unwrap_or(0);
        Ok(DictionaryCloningFlags::from_value(value))
    }
}
