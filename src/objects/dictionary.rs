//! DICTIONARY object: ordered name to handle mapping

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::entities::attributes::{DefSubclass, DxfAttr, DxfAttributes};
use crate::entities::common::base_class;
use crate::entities::{DxfEntity, EntityKind};
use crate::error::Result;
use crate::io::dxf::writer::DxfStreamWriter;
use crate::io::dxf::{DxfValue, Tag, Tags};
use crate::types::Handle;

pub static DICTIONARY_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        DefSubclass::new(
            Some("AcDbDictionary"),
            vec![
                // 1 = entries are hard owned and deleted with the dictionary
                DxfAttr::int("hard_owned", 280).default(0).optional(),
                DxfAttr::int("cloning", 281).default(1),
            ],
        ),
    ])
});

const KEY_CODE: i32 = 3;
const SOFT_OWNER_CODE: i32 = 350;
const HARD_OWNER_CODE: i32 = 360;

/// One entry, `code` is 350 (soft owner) or 360 (hard owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub code: i32,
    pub handle: Handle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryData {
    entries: IndexMap<String, DictionaryEntry>,
}

impl DictionaryData {
    /// Take `(3, key) (350|360, handle)` pairs out of `tags`.
    pub(crate) fn load(&mut self, tags: &mut Tags) -> Result<()> {
        let mut remaining = Tags::new();
        let mut pending_key: Option<String> = None;
        for tag in std::mem::take(tags) {
            if tag.code == KEY_CODE {
                if let DxfValue::Text(key) = tag.value {
                    if let Some(previous) = pending_key.replace(key) {
                        remaining.push(Tag::new(KEY_CODE, previous));
                    }
                    continue;
                }
                remaining.push(tag);
                continue;
            }
            let handle = match tag.code {
                SOFT_OWNER_CODE | HARD_OWNER_CODE => tag.value.as_handle(),
                _ => None,
            };
            match (handle, pending_key.take()) {
                (Some(handle), Some(key)) => {
                    self.entries.insert(key, DictionaryEntry { code: tag.code, handle });
                }
                (_, key) => {
                    pending_key = key;
                    remaining.push(tag);
                }
            }
        }
        if let Some(key) = pending_key {
            remaining.push(Tag::new(KEY_CODE, key));
        }
        *tags = remaining;
        Ok(())
    }

    pub(crate) fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        for (key, entry) in &self.entries {
            writer.write_string(KEY_CODE, key)?;
            writer.write_handle(entry.code, entry.handle)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Handle> {
        self.entries.get(key).map(|entry| entry.handle)
    }

    pub fn get_entry(&self, key: &str) -> Option<&DictionaryEntry> {
        self.entries.get(key)
    }

    /// Add or replace a soft owned entry
    pub fn add(&mut self, key: impl Into<String>, handle: Handle) {
        self.insert(key, SOFT_OWNER_CODE, handle);
    }

    /// Add or replace a hard owned entry
    pub fn add_hard(&mut self, key: impl Into<String>, handle: Handle) {
        self.insert(key, HARD_OWNER_CODE, handle);
    }

    fn insert(&mut self, key: impl Into<String>, code: i32, handle: Handle) {
        self.entries.insert(key.into(), DictionaryEntry { code, handle });
    }

    /// Add or replace an entry keeping its ownership code
    pub(crate) fn insert_entry(&mut self, key: impl Into<String>, entry: DictionaryEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn discard(&mut self, key: &str) -> Option<Handle> {
        self.entries.shift_remove(key).map(|entry| entry.handle)
    }

    /// Key of the first entry pointing to `handle`
    pub fn find_key(&self, handle: Handle) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.handle == handle)
            .map(|(key, _)| key.as_str())
    }

    /// Remove all entries pointing to `handle`, returns `true` if any existed
    pub fn remove_handle(&mut self, handle: Handle) -> bool {
        let count = self.entries.len();
        self.entries.retain(|_, entry| entry.handle != handle);
        count != self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entries.values().map(|entry| entry.handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DictionaryEntry)> + '_ {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

impl DxfEntity {
    /// New virtual DICTIONARY
    pub fn new_dictionary(hard_owned: bool) -> Self {
        let mut dictionary = DxfEntity::new(EntityKind::Dictionary(DictionaryData::default()));
        if hard_owned {
            dictionary.dxf.unprotected_set("hard_owned", DxfValue::Int(1));
        }
        dictionary
    }

    pub fn dictionary(&self) -> Option<&DictionaryData> {
        match self.kind() {
            EntityKind::Dictionary(data) => Some(data),
            _ => None,
        }
    }

    pub fn dictionary_mut(&mut self) -> Option<&mut DictionaryData> {
        match self.kind_mut() {
            EntityKind::Dictionary(data) => Some(data),
            _ => None,
        }
    }

    /// True for a DICTIONARY owning its entries
    pub fn is_hard_owner(&self) -> bool {
        self.dictionary().is_some()
            && matches!(self.dxf.get("hard_owned"), Ok(Some(DxfValue::Int(flag))) if flag != 0)
    }
}
