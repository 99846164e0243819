//! DXF entities
//!
//! Every entity is a [`DxfEntity`]: a schema-checked [`DxfNamespace`] plus
//! optional side tables, tagged with an [`EntityKind`] for the few types that
//! carry data outside of their attributes. Loading and export are generic
//! and driven by the schema of the kind.

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{
    ACAD_REACTORS, ACAD_XDICTIONARY, DIMSTYLE_HANDLE_CODE, HANDLE_CODE, OWNER_CODE,
    STRUCTURE_MARKER, SUBCLASS_MARKER,
};
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt, DxfWriterConfiguration};
use crate::io::dxf::{DxfValue, Tag, Tags};
use crate::objects::{DictionaryData, XRecordData};
use crate::types::{DxfVersion, Handle};
use crate::xdata::XData;

pub mod appdata;
pub mod arc;
pub mod attrib;
pub mod attributes;
pub mod circle;
pub mod common;
pub mod embedded;
pub mod extended_tags;
pub mod factory;
pub mod line;
pub mod lwpolyline;
pub mod namespace;
pub mod point;
pub mod processor;
pub mod reactors;
pub mod text;
pub mod unknown_entity;
pub mod xdict;

pub use appdata::AppData;
pub use attributes::{AttrKind, ComputedAttribute, DefSubclass, DxfAttr, DxfAttributes};
pub use embedded::EmbeddedObjects;
pub use extended_tags::ExtendedTags;
pub use lwpolyline::{LwPolylineData, LwVertex};
pub use namespace::DxfNamespace;
pub use processor::SubclassProcessor;
pub use reactors::Reactors;
pub use unknown_entity::TagStorage;
pub use xdict::ExtensionDict;

use attributes::DxfAttr as Attr;
use namespace::write_attr_value;

/// Lifecycle of an entity: `Virtual -> Bound -> Deleted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Not stored in an entity database
    Virtual,
    /// Stored in an entity database
    Bound,
    /// Destroyed, terminal
    Deleted,
}

/// Concrete entity types
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Line,
    Point,
    Circle,
    Arc,
    Text,
    Attrib,
    LwPolyline(LwPolylineData),
    Layer,
    Dictionary(DictionaryData),
    XRecord(XRecordData),
    /// Any other type, kept verbatim
    TagStorage(TagStorage),
}

impl EntityKind {
    /// DXF type name like `"LINE"`
    pub fn dxftype(&self) -> &str {
        match self {
            EntityKind::Line => "LINE",
            EntityKind::Point => "POINT",
            EntityKind::Circle => "CIRCLE",
            EntityKind::Arc => "ARC",
            EntityKind::Text => "TEXT",
            EntityKind::Attrib => "ATTRIB",
            EntityKind::LwPolyline(_) => "LWPOLYLINE",
            EntityKind::Layer => "LAYER",
            EntityKind::Dictionary(_) => "DICTIONARY",
            EntityKind::XRecord(_) => "XRECORD",
            EntityKind::TagStorage(storage) => storage.dxftype(),
        }
    }

    pub fn schema(&self) -> &'static DxfAttributes {
        match self {
            EntityKind::Line => &line::LINE_SCHEMA,
            EntityKind::Point => &point::POINT_SCHEMA,
            EntityKind::Circle => &circle::CIRCLE_SCHEMA,
            EntityKind::Arc => &arc::ARC_SCHEMA,
            EntityKind::Text => &text::TEXT_SCHEMA,
            EntityKind::Attrib => &attrib::ATTRIB_SCHEMA,
            EntityKind::LwPolyline(_) => &lwpolyline::LWPOLYLINE_SCHEMA,
            EntityKind::Layer => &crate::tables::layer::LAYER_SCHEMA,
            EntityKind::Dictionary(_) => &crate::objects::dictionary::DICTIONARY_SCHEMA,
            EntityKind::XRecord(_) => &crate::objects::xrecord::XRECORD_SCHEMA,
            EntityKind::TagStorage(_) => &unknown_entity::TAG_STORAGE_SCHEMA,
        }
    }

    /// Oldest version able to store this type
    pub fn min_version(&self) -> DxfVersion {
        match self {
            EntityKind::LwPolyline(_) | EntityKind::Dictionary(_) | EntityKind::XRecord(_) => {
                DxfVersion::R2000
            }
            _ => DxfVersion::R12,
        }
    }

    /// Move kind data out of the unprocessed tags of the last subclass.
    fn load_data(&mut self, unprocessed: &mut Tags) -> Result<()> {
        match self {
            EntityKind::LwPolyline(data) => data.load(unprocessed),
            EntityKind::Dictionary(data) => data.load(unprocessed),
            _ => Ok(()),
        }
    }

    /// Attributes written after the kind data
    fn trailing_attribs(&self) -> &'static [&'static str] {
        match self {
            EntityKind::LwPolyline(_) => lwpolyline::TRAILING_ATTRIBS,
            _ => &[],
        }
    }

    fn export_data(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        match self {
            EntityKind::LwPolyline(data) => data.export_dxf(writer),
            EntityKind::Dictionary(data) => data.export_dxf(writer),
            EntityKind::XRecord(data) => data.export_dxf(writer),
            _ => Ok(()),
        }
    }
}

/// One DXF entity, table entry or object
#[derive(Debug, Clone)]
pub struct DxfEntity {
    kind: EntityKind,
    pub dxf: DxfNamespace,
    pub appdata: Option<AppData>,
    pub reactors: Option<Reactors>,
    pub xdict: Option<ExtensionDict>,
    pub xdata: Option<XData>,
    pub embedded_objects: Option<EmbeddedObjects>,
    /// Unprocessed tags per schema fragment, index 0 is the base class
    unprocessed: Vec<Tags>,
    /// Subclasses following the last known one, markers included
    extra_subclasses: Vec<Tags>,
    state: EntityState,
}

impl DxfEntity {
    /// New virtual entity with default attributes
    pub fn new(kind: EntityKind) -> Self {
        let schema = kind.schema();
        let dxf = DxfNamespace::new(schema, kind.dxftype());
        Self {
            kind,
            dxf,
            appdata: None,
            reactors: None,
            xdict: None,
            xdata: None,
            embedded_objects: None,
            unprocessed: vec![Tags::new(); schema.subclasses().len()],
            extra_subclasses: Vec::new(),
            state: EntityState::Virtual,
        }
    }

    /// New virtual entity with attributes set from `(name, value)` pairs
    pub fn with_attribs<'n, I, V>(kind: EntityKind, attribs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'n str, V)>,
        V: Into<DxfValue>,
    {
        let mut entity = Self::new(kind);
        for (name, value) in attribs {
            entity.set(name, value)?;
        }
        Ok(entity)
    }

    /// Load a partitioned entity
    pub fn load(
        xtags: &ExtendedTags,
        kind: EntityKind,
        version: DxfVersion,
        log_unprocessed_tags: bool,
    ) -> Result<Self> {
        let mut entity = Self::new(kind);
        entity.load_side_tables(xtags)?;
        let processor = SubclassProcessor::new(xtags, version);
        let base = processor.load_base_class(&mut entity.dxf);

        if let EntityKind::TagStorage(storage) = &mut entity.kind {
            storage.load(xtags, processor.r12());
            entity.unprocessed = vec![base];
            return Ok(entity);
        }

        let schema = entity.dxf.schema();
        let count = schema.subclasses().len();
        let mut unprocessed = vec![Tags::new(); count];
        if processor.r12() {
            // flat layout: unknown tags go behind the last subclass
            let flat = processor.fast_load_dxfattribs(&mut entity.dxf, schema.legacy_mapping(), 0, false);
            if let Some(last) = unprocessed.last_mut() {
                *last = flat;
            }
        } else {
            unprocessed[0] = base;
            for index in 1..count {
                if let EntityKind::XRecord(data) = &mut entity.kind {
                    // user data, 280 is the cloning flag only in front
                    if let Some(subclass) = processor.subclass_by_index(index) {
                        data.load(&mut entity.dxf, subclass);
                    }
                    continue;
                }
                if let Some(mapping) = schema.group_code_mapping(index) {
                    unprocessed[index] =
                        processor.fast_load_dxfattribs(&mut entity.dxf, mapping, index, false);
                }
            }
            entity.extra_subclasses = xtags.subclasses.iter().skip(count).cloned().collect();
        }
        if let Some(last) = unprocessed.last_mut() {
            entity.kind.load_data(last)?;
        }

        if log_unprocessed_tags {
            for (index, tags) in unprocessed.iter().enumerate() {
                let subclass = if processor.r12() { 0 } else { index };
                processor.log_unprocessed(tags, subclass);
            }
        }
        entity.unprocessed = unprocessed;
        Ok(entity)
    }

    fn load_side_tables(&mut self, xtags: &ExtendedTags) -> Result<()> {
        for block in &xtags.appdata {
            match block.first().and_then(Tag::text) {
                Some(ACAD_REACTORS) => self.reactors = Some(Reactors::from_tags(block)?),
                Some(ACAD_XDICTIONARY) => self.xdict = Some(ExtensionDict::from_tags(block)?),
                _ => self.appdata.get_or_insert_with(AppData::new).set(block.clone())?,
            }
        }
        if !xtags.xdata.is_empty() {
            self.xdata = Some(XData::from_blocks(xtags.xdata.iter().cloned())?);
        }
        if let Some(objects) = &xtags.embedded_objects {
            self.embedded_objects = Some(EmbeddedObjects::new(objects.clone()));
        }
        Ok(())
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    pub fn dxftype(&self) -> &str {
        self.kind.dxftype()
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    pub fn is_virtual(&self) -> bool {
        self.state == EntityState::Virtual
    }

    pub fn is_bound(&self) -> bool {
        self.state == EntityState::Bound
    }

    pub fn is_deleted(&self) -> bool {
        self.state == EntityState::Deleted
    }

    pub fn handle(&self) -> Option<Handle> {
        self.dxf.handle()
    }

    pub fn owner(&self) -> Handle {
        self.dxf.owner()
    }

    pub fn set_owner(&mut self, owner: Handle) {
        self.dxf.set_owner(owner);
    }

    /// Type and handle for messages, like `"LINE(#1A)"`
    pub fn entity_name(&self) -> String {
        match self.handle() {
            Some(handle) => format!("{}(#{})", self.dxftype(), handle),
            None => self.dxftype().to_string(),
        }
    }

    /// Attribute value: stored, else the schema default. Computed attributes
    /// call their getter.
    pub fn get(&self, name: &str) -> Result<Option<DxfValue>> {
        let attr = self.dxf.attr(name)?;
        match attr.computed {
            Some(computed) => computed.get(self),
            None => self.dxf.get(name),
        }
    }

    /// Attribute value, `fallback` if unset
    pub fn get_or(&self, name: &str, fallback: impl Into<DxfValue>) -> Result<DxfValue> {
        let attr = self.dxf.attr(name)?;
        match attr.computed {
            Some(computed) => Ok(computed.get(self)?.unwrap_or_else(|| fallback.into())),
            None => self.dxf.get_or(name, fallback),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<DxfValue>) -> Result<()> {
        let attr = self.dxf.attr(name)?;
        match attr.computed {
            Some(computed) => computed.set(self, value.into()),
            None => self.dxf.set(name, value),
        }
    }

    /// Store `value` even if it is the default of an optional attribute
    pub fn set_forced(&mut self, name: &str, value: impl Into<DxfValue>) -> Result<()> {
        let attr = self.dxf.attr(name)?;
        match attr.computed {
            Some(computed) => computed.set(self, value.into()),
            None => self.dxf.set_forced(name, value),
        }
    }

    /// True only if a value is stored, computed attributes never are
    pub fn has(&self, name: &str) -> Result<bool> {
        self.dxf.has(name)
    }

    pub fn discard(&mut self, name: &str) -> Result<()> {
        self.dxf.discard(name)
    }

    /// Text attribute, `None` if unset without default
    pub fn get_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name)?.and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Unprocessed tags of the schema fragment at `index`
    pub fn unprocessed_tags(&self, index: usize) -> Option<&Tags> {
        self.unprocessed.get(index)
    }

    pub fn has_unprocessed_tags(&self) -> bool {
        self.unprocessed.iter().any(|tags| !tags.is_empty()) || !self.extra_subclasses.is_empty()
    }

    pub fn has_extension_dict(&self) -> bool {
        self.xdict.is_some()
    }

    pub fn get_extension_dict(&self) -> Option<Handle> {
        self.xdict.map(|xdict| xdict.handle())
    }

    pub fn has_reactors(&self) -> bool {
        self.reactors.as_ref().map_or(false, |reactors| !reactors.is_empty())
    }

    pub fn get_reactors(&self) -> Vec<Handle> {
        self.reactors.as_ref().map(Reactors::get).unwrap_or_default()
    }

    pub fn append_reactor_handle(&mut self, handle: Handle) {
        self.reactors.get_or_insert_with(Reactors::default).add(handle);
    }

    pub fn discard_reactor_handle(&mut self, handle: Handle) {
        if let Some(reactors) = &mut self.reactors {
            reactors.discard(handle);
        }
    }

    pub fn has_app_data(&self, appid: &str) -> bool {
        self.appdata.as_ref().map_or(false, |appdata| appdata.has(appid))
    }

    pub fn get_app_data(&self, appid: &str) -> Option<&Tags> {
        self.appdata.as_ref()?.get(appid)
    }

    pub fn set_app_data<I: IntoIterator<Item = Tag>>(&mut self, appid: &str, tags: I) -> Result<()> {
        self.appdata.get_or_insert_with(AppData::new).add(appid, tags)
    }

    pub fn discard_app_data(&mut self, appid: &str) {
        if let Some(appdata) = &mut self.appdata {
            appdata.discard(appid);
        }
    }

    pub fn has_xdata(&self, appid: &str) -> bool {
        self.xdata.as_ref().map_or(false, |xdata| xdata.has_xdata(appid))
    }

    pub fn get_xdata(&self, appid: &str) -> Option<&Tags> {
        self.xdata.as_ref()?.get(appid)
    }

    pub fn set_xdata<I: IntoIterator<Item = Tag>>(&mut self, appid: &str, tags: I) -> Result<()> {
        self.xdata.get_or_insert_with(XData::new).add(appid, tags)
    }

    pub fn discard_xdata(&mut self, appid: &str) {
        if let Some(xdata) = &mut self.xdata {
            xdata.discard(appid);
        }
    }

    /// Virtual copy without handle, owner, reactors and extension dictionary
    pub fn copy_virtual(&self) -> Self {
        let mut copy = self.clone();
        copy.dxf.discard_handle();
        copy.dxf.set_owner(Handle::NULL);
        copy.reactors = None;
        copy.xdict = None;
        copy.state = EntityState::Virtual;
        copy
    }

    /// Export the entity as tags for the target version of `config`.
    pub fn export_dxf(&self, writer: &mut dyn DxfStreamWriter, config: &DxfWriterConfiguration) -> Result<()> {
        let version = config.target_version();
        let required = self.kind.min_version();
        if version < required {
            return Err(DxfError::VersionUnsupported {
                entity: self.entity_name(),
                required: required.to_string(),
                target: version.to_string(),
            });
        }
        self.export_base_class(writer, config)?;
        self.export_entity(writer, config)?;
        if version > DxfVersion::R12 {
            if let Some(embedded) = &self.embedded_objects {
                embedded.export_dxf(writer)?;
            }
        }
        if let Some(xdata) = &self.xdata {
            xdata.export_dxf(writer)?;
        }
        Ok(())
    }

    fn export_base_class(&self, writer: &mut dyn DxfStreamWriter, config: &DxfWriterConfiguration) -> Result<()> {
        let version = config.target_version();
        writer.write_string(STRUCTURE_MARKER, self.dxftype())?;
        if let Some(handle) = self.handle() {
            if version > DxfVersion::R12 || config.write_handles {
                let code = if self.dxftype() == "DIMSTYLE" {
                    DIMSTYLE_HANDLE_CODE
                } else {
                    HANDLE_CODE
                };
                writer.write_handle(code, handle)?;
            }
        }
        if version > DxfVersion::R12 {
            if let Some(appdata) = &self.appdata {
                appdata.export_dxf(writer)?;
            }
            if let Some(reactors) = self.reactors.as_ref().filter(|reactors| !reactors.is_empty()) {
                reactors.export_dxf(writer)?;
            }
            if let Some(xdict) = &self.xdict {
                xdict.export_dxf(writer)?;
            }
            // unowned entities write a null owner
            writer.write_handle(OWNER_CODE, self.owner())?;
        }
        if let Some(tags) = self.unprocessed.first() {
            writer.write_tags(tags)?;
        }
        Ok(())
    }

    fn export_entity(&self, writer: &mut dyn DxfStreamWriter, config: &DxfWriterConfiguration) -> Result<()> {
        let modern = config.target_version() > DxfVersion::R12;
        let schema = self.dxf.schema();
        for (index, fragment) in schema.subclasses().iter().enumerate().skip(1) {
            if modern {
                if let Some(name) = fragment.name {
                    writer.write_subclass(name)?;
                }
            }
            let is_last = index + 1 == schema.subclasses().len();
            let trailing: &[&str] = if is_last { self.kind.trailing_attribs() } else { &[] };
            let leading = fragment.attribs.iter().filter(|attr| !trailing.contains(&attr.name));
            self.export_dxf_attribs(leading, writer, config)?;
            if is_last {
                self.kind.export_data(writer)?;
                let trailing = fragment.attribs.iter().filter(|attr| trailing.contains(&attr.name));
                self.export_dxf_attribs(trailing, writer, config)?;
            }
            if let Some(tags) = self.unprocessed.get(index) {
                writer.write_tags(tags)?;
            }
        }
        for subclass in &self.extra_subclasses {
            let skip = usize::from(!modern && subclass.first().map_or(false, |tag| tag.code == SUBCLASS_MARKER));
            for tag in subclass.iter().skip(skip) {
                writer.write_tag(tag)?;
            }
        }
        if let EntityKind::TagStorage(storage) = &self.kind {
            storage.export_dxf(writer, modern)?;
        }
        Ok(())
    }

    /// Export attributes in the given order.
    ///
    /// Computed attributes write their getter value, those without a group
    /// code (negative code) are never written.
    pub fn export_dxf_attribs<'a, I>(
        &self,
        attribs: I,
        writer: &mut dyn DxfStreamWriter,
        config: &DxfWriterConfiguration,
    ) -> Result<()>
    where
        I: IntoIterator<Item = &'a Attr>,
    {
        for attr in attribs {
            let value = match attr.computed {
                Some(_) if attr.code < 0 => None,
                Some(computed) if config.target_version() >= attr.min_version => {
                    computed.get(self).map_err(|err| DxfError::Export {
                        entity: self.entity_name(),
                        attribute: attr.name.to_string(),
                        message: err.to_string(),
                    })?
                }
                Some(_) => None,
                None => self.dxf.export_value(attr, config),
            };
            if let Some(value) = value {
                write_attr_value(writer, attr, value)?;
            }
        }
        Ok(())
    }

    /// Export attributes by name in the given order
    pub fn export_dxf_attribs_by_name(
        &self,
        names: &[&str],
        writer: &mut dyn DxfStreamWriter,
        config: &DxfWriterConfiguration,
    ) -> Result<()> {
        let attribs = names
            .iter()
            .map(|name| self.dxf.attr(name))
            .collect::<Result<Vec<_>>>()?;
        self.export_dxf_attribs(attribs, writer, config)
    }

    /// Export into a tag list, see [`export_dxf`](Self::export_dxf)
    pub fn to_tags(&self, config: &DxfWriterConfiguration) -> Result<Tags> {
        let mut collector = crate::io::dxf::writer::TagCollector::new();
        self.export_dxf(&mut collector, config)?;
        Ok(collector.into_tags())
    }
}

impl PartialEq for DxfEntity {
    /// Same kind, same stored attributes and side tables
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.dxf.iter().eq(other.dxf.iter())
            && self.appdata == other.appdata
            && self.reactors == other.reactors
            && self.xdict == other.xdict
            && self.xdata == other.xdata
            && self.embedded_objects == other.embedded_objects
            && self.unprocessed == other.unprocessed
            && self.extra_subclasses == other.extra_subclasses
    }
}
