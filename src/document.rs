//! DXF document: sections in file order over an entity database

use std::io::Read;

use ahash::AHashSet;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::database::{EntityDb, EXCLUDED_TYPES};
use crate::entities::factory::load_entity;
use crate::entities::DxfEntity;
use crate::error::Result;
use crate::io::dxf::group_code::{OWNER_CODE, SUBCLASS_MARKER};
use crate::io::dxf::reader::{load_dxf_structure, DxfReader, DxfReaderConfiguration, ENTITY_SECTIONS};
use crate::io::dxf::writer::{DxfStreamWriter, DxfWriterConfiguration, SectionWriter, TagCollector};
use crate::io::dxf::{DxfValue, Tag, Tags};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{DxfVersion, Handle};

pub const HEADER_SECTION: &str = "HEADER";
pub const ENTITIES_SECTION: &str = "ENTITIES";
pub const OBJECTS_SECTION: &str = "OBJECTS";

/// Group code of a header variable name
const HEADER_VAR_CODE: i32 = 9;

/// One item of an entity section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionItem {
    /// Structure tags kept verbatim, like `TABLE` heads and `ENDTAB`
    Raw(Tags),
    /// A bound entity of the database
    Entity(Handle),
}

/// Header variables in file order, each with the tags following `(9, $NAME)`.
///
/// Repeated names are kept as found, lookups by name see the first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderVars {
    vars: Vec<(String, Tags)>,
}

impl HeaderVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Tags> {
        self.vars.iter().find(|(var, _)| var == name).map(|(_, tags)| tags)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tags> {
        self.vars.iter_mut().find(|(var, _)| var == name).map(|(_, tags)| tags)
    }

    /// Replace the first variable `name`, or append it
    pub fn set(&mut self, name: &str, tags: Tags) {
        match self.get_mut(name) {
            Some(existing) => *existing = tags,
            None => self.vars.push((name.to_string(), tags)),
        }
    }

    /// Append a variable, an existing one of the same name is kept
    pub fn push(&mut self, name: impl Into<String>, tags: Tags) {
        self.vars.push((name.into(), tags));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.vars.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tags)> + '_ {
        self.vars.iter().map(|(name, tags)| (name.as_str(), tags))
    }
}

#[derive(Debug, Clone)]
pub struct DxfDocument {
    /// Version of the loaded file, the default export target
    pub version: DxfVersion,
    pub header: HeaderVars,
    sections: IndexMap<String, Vec<SectionItem>>,
    pub entitydb: EntityDb,
    /// Non-fatal findings of the last load
    pub notifications: NotificationCollection,
}

impl DxfDocument {
    /// Empty document with HEADER, ENTITIES and (after R12) OBJECTS sections
    pub fn new(version: DxfVersion) -> Self {
        let mut sections = IndexMap::new();
        sections.insert(HEADER_SECTION.to_string(), Vec::new());
        sections.insert(ENTITIES_SECTION.to_string(), Vec::new());
        if !version.is_legacy() {
            sections.insert(OBJECTS_SECTION.to_string(), Vec::new());
        }
        let mut header = HeaderVars::new();
        header.push("$ACADVER", Tags::from(vec![Tag::new(1, version.as_str())]));
        header.push("$HANDSEED", Tags::from(vec![Tag::new(5, Handle::new(1))]));
        Self {
            version,
            header,
            sections,
            entitydb: EntityDb::new(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Load a document from a compiled tag stream.
    ///
    /// Structure errors abort the load, no partial document is returned.
    pub fn load<I>(tags: I, config: &DxfReaderConfiguration) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Tag>>,
    {
        let structure = load_dxf_structure(tags)?;
        let mut notifications = NotificationCollection::new();
        let header = structure
            .get(HEADER_SECTION)
            .map(|groups| parse_header(groups))
            .unwrap_or_default();

        let version = match header.get("$ACADVER").and_then(|tags| tags.get_first_value(1)) {
            None => DxfVersion::R12,
            Some(value) => match value.as_str().and_then(DxfVersion::from_version_string) {
                Some(version) => version,
                None => {
                    notifications.notify(
                        NotificationType::InvalidHeaderVar,
                        None,
                        format!("Invalid $ACADVER value {}, loaded as {}", value, DxfVersion::LATEST.as_str()),
                    );
                    DxfVersion::LATEST
                }
            },
        };
        let seed = header
            .get("$HANDSEED")
            .and_then(|tags| tags.first())
            .and_then(|tag| tag.value.as_handle())
            .unwrap_or(Handle::new(1));
        debug!("loading DXF {} ({})", version.as_str(), version.release());

        let mut entitydb = EntityDb::with_seed(seed);
        let mut sections = IndexMap::new();
        for (name, groups) in structure {
            let mut items = Vec::new();
            if name == HEADER_SECTION {
                sections.insert(name, items);
                continue;
            }
            let entity_section = ENTITY_SECTIONS.contains(&name.as_str());
            for group in groups {
                let is_entity = entity_section
                    && group
                        .dxftype()
                        .map_or(false, |dxftype| !EXCLUDED_TYPES.contains(&dxftype));
                if !is_entity {
                    items.push(SectionItem::Raw(group));
                    continue;
                }
                let handle = load_entity(group, version, config, &mut notifications)
                    .and_then(|entity| entitydb.add(entity))
                    .map_err(|err| err.with_context(format!("section {}", name)))?;
                items.push(SectionItem::Entity(handle));
            }
            sections.insert(name, items);
        }
        entitydb.update_generator()?;

        let mut document = Self {
            version,
            header,
            sections,
            entitydb,
            notifications,
        };
        for handle in document.structure_handles() {
            document.entitydb.reserve_handle(handle)?;
        }
        document.check_references();
        Ok(document)
    }

    /// Read a DXF text stream
    pub fn read<R: Read>(reader: R, config: &DxfReaderConfiguration) -> Result<Self> {
        DxfReader::from_reader(reader)
            .with_configuration(config.clone())
            .read()
    }

    /// Handles of raw section items, like `TABLE` heads owning the table
    /// entries.
    fn structure_handles(&self) -> AHashSet<Handle> {
        self.sections
            .values()
            .flatten()
            .filter_map(|item| match item {
                SectionItem::Raw(tags) => tags.get_handle(),
                SectionItem::Entity(_) => None,
            })
            .collect()
    }

    /// Report owner and extension dictionary handles without entity.
    fn check_references(&mut self) {
        let structure = self.structure_handles();
        for (handle, entity) in self.entitydb.iter() {
            let owner = entity.owner();
            if !owner.is_null() && !self.entitydb.contains(owner) && !structure.contains(&owner) {
                warn!("owner #{} of {} not found", owner, entity.entity_name());
                self.notifications.notify(
                    NotificationType::DanglingReference,
                    Some(handle),
                    format!("Owner #{} of entity #{} does not exist", owner, handle),
                );
            }
            if let Some(xdict) = entity.get_extension_dict() {
                if !self.entitydb.contains(xdict) {
                    warn!("extension dictionary #{} of {} not found", xdict, entity.entity_name());
                    self.notifications.notify(
                        NotificationType::DanglingReference,
                        Some(handle),
                        format!("Extension dictionary #{} of entity #{} does not exist", xdict, handle),
                    );
                }
            }
        }
    }

    /// Section names in file order
    pub fn section_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section(&self, name: &str) -> Option<&[SectionItem]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    pub(crate) fn sections(&self) -> impl Iterator<Item = (&str, &[SectionItem])> + '_ {
        self.sections
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Bound entities of section `name` in file order
    pub fn entities<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a DxfEntity> + 'a {
        self.sections
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|item| match item {
                SectionItem::Entity(handle) => self.entitydb.try_get(*handle),
                SectionItem::Raw(_) => None,
            })
    }

    /// Value tags of header variable `name`, like `"$ACADVER"`
    pub fn header_var(&self, name: &str) -> Option<&Tags> {
        self.header.get(name)
    }

    pub fn set_header_var<I: IntoIterator<Item = Tag>>(&mut self, name: &str, tags: I) {
        self.header.set(name, tags.into_iter().collect());
    }

    /// Bind `entity` and append it to section `name`
    pub fn add_entity(&mut self, name: &str, entity: DxfEntity) -> Result<Handle> {
        let handle = self.entitydb.add(entity)?;
        self.section_items(name).push(SectionItem::Entity(handle));
        Ok(handle)
    }

    /// Delete an entity, cascaded deletions leave their sections too.
    pub fn delete_entity(&mut self, handle: Handle) -> Result<DxfEntity> {
        let entity = self.entitydb.delete(handle)?;
        let entitydb = &self.entitydb;
        for items in self.sections.values_mut() {
            items.retain(|item| match item {
                SectionItem::Entity(handle) => entitydb.contains(*handle),
                SectionItem::Raw(_) => true,
            });
        }
        Ok(entity)
    }

    /// Duplicate an entity into the section of its source.
    ///
    /// Copied extension dictionaries and their entries go to OBJECTS.
    pub fn duplicate_entity(&mut self, handle: Handle) -> Result<Handle> {
        let section = self
            .sections
            .iter()
            .find(|(_, items)| items.contains(&SectionItem::Entity(handle)))
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| ENTITIES_SECTION.to_string());
        let count = self.entitydb.len();
        let copy = self.entitydb.duplicate(handle)?;
        let created: Vec<Handle> = self.entitydb.handles().skip(count).collect();
        for created in created {
            let name = if created == copy { section.as_str() } else { OBJECTS_SECTION };
            self.section_items(name).push(SectionItem::Entity(created));
        }
        Ok(copy)
    }

    /// New extension dictionary of `host`, stored in OBJECTS.
    pub fn new_extension_dict(&mut self, host: Handle) -> Result<Handle> {
        if let Some(existing) = self.entitydb.get(host)?.get_extension_dict() {
            return Ok(existing);
        }
        let xdict = self.entitydb.new_extension_dict(host)?;
        self.section_items(OBJECTS_SECTION).push(SectionItem::Entity(xdict));
        Ok(xdict)
    }

    fn section_items(&mut self, name: &str) -> &mut Vec<SectionItem> {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Header variables for export, `$ACADVER` and `$HANDSEED` updated
    pub(crate) fn export_header(&self, version: DxfVersion) -> HeaderVars {
        let mut header = self.header.clone();
        if let Some(tags) = header.get_mut("$ACADVER") {
            tags.set_first(Tag::new(1, version.as_str()));
        }
        if let Some(tags) = header.get_mut("$HANDSEED") {
            tags.set_first(Tag::new(5, self.entitydb.generator().peek()));
        }
        header
    }

    /// Write the whole document, the target version defaults to the
    /// document version.
    pub fn export(&self, writer: &mut dyn DxfStreamWriter, config: &DxfWriterConfiguration) -> Result<()> {
        let config = DxfWriterConfiguration {
            version: Some(config.version.unwrap_or(self.version)),
            ..config.clone()
        };
        SectionWriter::new(writer, &config).write_document(self)
    }

    pub fn to_tags(&self, config: &DxfWriterConfiguration) -> Result<Tags> {
        let mut collector = TagCollector::new();
        self.export(&mut collector, config)?;
        Ok(collector.into_tags())
    }
}

impl Default for DxfDocument {
    fn default() -> Self {
        Self::new(DxfVersion::LATEST)
    }
}

/// Split the HEADER section into variables.
fn parse_header(groups: &[Tags]) -> HeaderVars {
    let mut header = HeaderVars::new();
    for tag in groups.iter().flatten() {
        if tag.code == HEADER_VAR_CODE {
            if let DxfValue::Text(name) = &tag.value {
                header.push(name.clone(), Tags::new());
                continue;
            }
        }
        match header.vars.last_mut() {
            Some((_, tags)) => tags.push(tag.clone()),
            None => debug!("ignored {} in front of the first header variable", tag),
        }
    }
    header
}

/// Raw tags of an entity section for an R12 target
pub(crate) fn strip_markers(tags: &Tags) -> Tags {
    tags.iter()
        .filter(|tag| tag.code != SUBCLASS_MARKER && tag.code != OWNER_CODE)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_groups_values() {
        let groups = vec![Tags::from(vec![
            Tag::new(9, "$ACADVER"),
            Tag::new(1, "AC1015"),
            Tag::new(9, "$EXTMIN"),
            Tag::new(10, (0.0, 1.0, 2.0)),
            Tag::new(9, "$HANDSEED"),
            Tag::new(5, Handle::new(0x20)),
        ])];
        let header = parse_header(&groups);
        assert_eq!(header.len(), 3);
        assert_eq!(header.get("$ACADVER").map(|tags| tags.len()), Some(1));
        assert_eq!(header.get("$EXTMIN").map(|tags| tags[0].code), Some(10));
        assert_eq!(
            header.get("$HANDSEED").and_then(|tags| tags[0].value.as_handle()),
            Some(Handle::new(0x20))
        );
    }

    #[test]
    fn test_parse_header_keeps_repeated_names() {
        let groups = vec![Tags::from(vec![
            Tag::new(9, "$DIMSTYLE"),
            Tag::new(2, "STANDARD"),
            Tag::new(9, "$CLAYER"),
            Tag::new(8, "0"),
            Tag::new(9, "$DIMSTYLE"),
            Tag::new(2, "ISO-25"),
        ])];
        let mut header = parse_header(&groups);
        assert_eq!(header.names().collect::<Vec<_>>(), vec!["$DIMSTYLE", "$CLAYER", "$DIMSTYLE"]);
        assert_eq!(header.get("$DIMSTYLE").and_then(|tags| tags.get_first_value(2)), Some(&DxfValue::from("STANDARD")));

        header.set("$DIMSTYLE", Tags::from(vec![Tag::new(2, "ANSI")]));
        assert_eq!(header.len(), 3);
        let last = header.iter().last().map(|(_, tags)| tags.clone());
        assert_eq!(last, Some(Tags::from(vec![Tag::new(2, "ISO-25")])));
    }

    #[test]
    fn test_new_document_sections() {
        let doc = DxfDocument::new(DxfVersion::AC1015);
        let names: Vec<&str> = doc.section_names().collect();
        assert_eq!(names, vec![HEADER_SECTION, ENTITIES_SECTION, OBJECTS_SECTION]);

        let legacy = DxfDocument::new(DxfVersion::R12);
        assert!(!legacy.has_section(OBJECTS_SECTION));
    }

    #[test]
    fn test_export_header_updates_version() {
        let doc = DxfDocument::new(DxfVersion::AC1015);
        let header = doc.export_header(DxfVersion::AC1018);
        assert_eq!(
            header.get("$ACADVER").and_then(|tags| tags.get_first_value(1)).and_then(DxfValue::as_str),
            Some("AC1018")
        );
    }

    #[test]
    fn test_strip_markers() {
        let tags = Tags::from(vec![
            Tag::new(0, "TABLE"),
            Tag::new(2, "LAYER"),
            Tag::new(330, Handle::new(0)),
            Tag::new(100, "AcDbSymbolTable"),
            Tag::new(70, 1),
        ]);
        let stripped = strip_markers(&tags);
        let codes: Vec<i32> = stripped.iter().map(|tag| tag.code).collect();
        assert_eq!(codes, vec![0, 2, 70]);
    }
}
