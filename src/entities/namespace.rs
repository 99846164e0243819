//! Entity namespace: sparse, schema-checked attribute storage

use indexmap::IndexMap;

use super::attributes::{DxfAttr, DxfAttributes};
use crate::error::{DxfError, Result};
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt, DxfWriterConfiguration};
use crate::io::dxf::{DxfValue, Tag};
use crate::types::Handle;

/// Attribute values of one entity
///
/// Only explicitly set values are stored, optional attributes are never
/// stored with their default value unless written by
/// [`set_forced`](DxfNamespace::set_forced). Computed attributes are not
/// stored here at all, [`DxfEntity`](super::DxfEntity) dispatches them.
#[derive(Debug, Clone)]
pub struct DxfNamespace {
    schema: &'static DxfAttributes,
    dxftype: String,
    values: IndexMap<&'static str, DxfValue>,
}

impl DxfNamespace {
    pub fn new(schema: &'static DxfAttributes, dxftype: impl Into<String>) -> Self {
        Self {
            schema,
            dxftype: dxftype.into(),
            values: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> &'static DxfAttributes {
        self.schema
    }

    pub fn dxftype(&self) -> &str {
        &self.dxftype
    }

    /// Schema entry of `name`, `UnknownAttribute` if the type does not declare it.
    pub fn attr(&self, name: &str) -> Result<&'static DxfAttr> {
        self.schema.get(name).ok_or_else(|| DxfError::UnknownAttribute {
            name: name.to_string(),
            dxftype: self.dxftype.clone(),
        })
    }

    /// Stored value, else the schema default.
    ///
    /// Computed attributes always read as `None` here.
    pub fn get(&self, name: &str) -> Result<Option<DxfValue>> {
        let attr = self.attr(name)?;
        Ok(self
            .values
            .get(attr.name)
            .or(attr.default.as_ref())
            .cloned())
    }

    /// Stored value, else `fallback`
    pub fn get_or(&self, name: &str, fallback: impl Into<DxfValue>) -> Result<DxfValue> {
        let attr = self.attr(name)?;
        Ok(self
            .values
            .get(attr.name)
            .cloned()
            .unwrap_or_else(|| fallback.into()))
    }

    /// Reference to the stored value, no default fallback
    pub fn get_stored(&self, name: &str) -> Option<&DxfValue> {
        self.values.get(name)
    }

    /// Coerce and store `value`; an optional attribute set to its default is
    /// discarded instead.
    pub fn set(&mut self, name: &str, value: impl Into<DxfValue>) -> Result<()> {
        let attr = self.storable_attr(name)?;
        let value = attr.cast(value.into())?;
        if attr.is_optional_default(&value) {
            self.values.shift_remove(attr.name);
        } else {
            self.values.insert(attr.name, value);
        }
        Ok(())
    }

    /// Coerce and store `value`, even an optional default.
    pub fn set_forced(&mut self, name: &str, value: impl Into<DxfValue>) -> Result<()> {
        let attr = self.storable_attr(name)?;
        let value = attr.cast(value.into())?;
        self.values.insert(attr.name, value);
        Ok(())
    }

    fn storable_attr(&self, name: &str) -> Result<&'static DxfAttr> {
        let attr = self.attr(name)?;
        if attr.is_computed() {
            return Err(DxfError::InvalidState(format!(
                "computed attribute \"{}\" of {} is not stored",
                name, self.dxftype
            )));
        }
        Ok(attr)
    }

    /// Store an already typed value loaded from a tag, no checks
    pub fn unprotected_set(&mut self, name: &'static str, value: DxfValue) {
        self.values.insert(name, value);
    }

    /// True only if a value is stored
    pub fn has(&self, name: &str) -> Result<bool> {
        let attr = self.attr(name)?;
        Ok(self.values.contains_key(attr.name))
    }

    /// Remove a stored value, a no-op if none is stored.
    pub fn discard(&mut self, name: &str) -> Result<()> {
        let attr = self.attr(name)?;
        self.values.shift_remove(attr.name);
        Ok(())
    }

    /// Stored values in the order they were set
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &DxfValue)> + '_ {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Handle of the bound entity, `None` for virtual entities
    pub fn handle(&self) -> Option<Handle> {
        self.values.get("handle").and_then(DxfValue::as_handle)
    }

    pub fn set_handle(&mut self, handle: Handle) {
        self.values.insert("handle", DxfValue::Handle(handle));
    }

    pub fn discard_handle(&mut self) {
        self.values.shift_remove("handle");
    }

    /// Owner handle, [`Handle::NULL`] for no owner
    pub fn owner(&self) -> Handle {
        self.values
            .get("owner")
            .and_then(DxfValue::as_handle)
            .unwrap_or(Handle::NULL)
    }

    pub fn set_owner(&mut self, owner: Handle) {
        self.values.insert("owner", DxfValue::Handle(owner));
    }

    /// Value to write for a stored attribute, `None` to skip it.
    ///
    /// - attributes newer than the target version are skipped
    /// - unset mandatory attributes write their default, if any
    /// - optional attributes equal to their default are skipped unless
    ///   `force_optional` is set
    pub fn export_value(&self, attr: &DxfAttr, config: &DxfWriterConfiguration) -> Option<DxfValue> {
        if config.target_version() < attr.min_version {
            return None;
        }
        let value = match self.values.get(attr.name) {
            Some(value) => value.clone(),
            None if attr.optional => return None,
            None => attr.default.clone()?,
        };
        if attr.is_optional_default(&value) && !config.force_optional {
            return None;
        }
        Some(value)
    }
}

/// Write one attribute tag, 2D points drop their z value.
pub fn write_attr_value(
    writer: &mut dyn DxfStreamWriter,
    attr: &DxfAttr,
    value: DxfValue,
) -> Result<()> {
    let value = match (attr.kind, value) {
        (super::attributes::AttrKind::Point2, DxfValue::Point3(point)) => DxfValue::Point2(point.xy()),
        (_, value) => value,
    };
    writer.write_tag(&Tag::new(attr.code, value))
}
