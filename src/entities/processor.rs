//! Subclass processor
//!
//! Loads the tag groups of an [`ExtendedTags`] record into a
//! [`DxfNamespace`] and returns what the schema does not know.

use ahash::AHashSet;
use log::info;

use super::attributes::{DefSubclass, GroupCodeMapping};
use super::extended_tags::ExtendedTags;
use super::namespace::DxfNamespace;
use crate::io::dxf::group_code::{
    APP_DATA_MARKER, DIMSTYLE_HANDLE_CODE, HANDLE_CODE, OWNER_CODE, STRUCTURE_MARKER,
    SUBCLASS_MARKER,
};
use crate::io::dxf::{DxfValue, Tag, Tags};
use crate::types::{DxfVersion, Handle};

pub struct SubclassProcessor<'a> {
    xtags: &'a ExtendedTags,
    r12: bool,
    dxftype: String,
    handle: Option<Handle>,
    log_unprocessed_tags: bool,
}

impl<'a> SubclassProcessor<'a> {
    pub fn new(xtags: &'a ExtendedTags, version: DxfVersion) -> Self {
        Self {
            xtags,
            r12: version == DxfVersion::R12 || xtags.subclasses.len() == 1,
            dxftype: xtags.dxftype().unwrap_or("UNKNOWN").to_string(),
            handle: xtags.get_handle(),
            log_unprocessed_tags: true,
        }
    }

    pub fn with_logging(mut self, log_unprocessed_tags: bool) -> Self {
        self.log_unprocessed_tags = log_unprocessed_tags;
        self
    }

    /// True for the flat layout without subclass markers
    pub fn r12(&self) -> bool {
        self.r12
    }

    pub fn dxftype(&self) -> &str {
        &self.dxftype
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn xtags(&self) -> &'a ExtendedTags {
        self.xtags
    }

    pub fn subclass_count(&self) -> usize {
        self.xtags.subclasses.len()
    }

    pub fn subclass_by_index(&self, index: usize) -> Option<&'a Tags> {
        self.xtags.subclasses.get(index)
    }

    /// Marker name of the subclass at `index`
    pub fn subclass_name(&self, index: usize) -> Option<&'a str> {
        self.subclass_by_index(index)?
            .first()
            .filter(|tag| tag.code == SUBCLASS_MARKER)
            .and_then(Tag::text)
    }

    /// Load handle and owner from the base class.
    ///
    /// Returns the base class tags that are neither the structure tag, the
    /// handle, the owner nor an application data placeholder. For the flat
    /// layout all attributes live in the base class, the caller loads them
    /// with [`fast_load_dxfattribs`](Self::fast_load_dxfattribs) and uses
    /// its result instead.
    pub fn load_base_class(&self, ns: &mut DxfNamespace) -> Tags {
        let mut unprocessed = Tags::new();
        let Some(tags) = self.subclass_by_index(0) else {
            return unprocessed;
        };
        let mut base = BaseTagFilter::default();
        for tag in tags.iter().skip(1) {
            if base.accept(tag) {
                match (tag.code, &tag.value) {
                    (OWNER_CODE, DxfValue::Handle(owner)) => ns.set_owner(*owner),
                    (_, DxfValue::Handle(handle)) => ns.set_handle(*handle),
                    _ => {}
                }
            } else if !is_app_data_placeholder(tag) {
                unprocessed.push(tag.clone());
            }
        }
        unprocessed
    }

    /// Load the subclass at `index` against one schema fragment.
    pub fn load_dxfattribs(&self, ns: &mut DxfNamespace, fragment: &DefSubclass, index: usize) -> Tags {
        self.fast_load_dxfattribs(ns, &fragment.group_code_mapping(), index, self.log_unprocessed_tags)
    }

    /// Load the subclass at `index` with a prepared group code mapping.
    ///
    /// A code mapped to several names assigns its occurrences to the names
    /// in declaration order; once all names are used further occurrences
    /// are unprocessed. Tags of computed attributes are consumed without
    /// storing a value, values which can not be coerced to the attribute
    /// kind are kept as unprocessed tags.
    pub fn fast_load_dxfattribs(
        &self,
        ns: &mut DxfNamespace,
        mapping: &GroupCodeMapping,
        index: usize,
        log: bool,
    ) -> Tags {
        let mut unprocessed = Tags::new();
        let Some(tags) = self.subclass_by_index(index) else {
            return unprocessed;
        };
        let skip = match tags.first() {
            Some(tag) if tag.code == STRUCTURE_MARKER || tag.code == SUBCLASS_MARKER => 1,
            _ => 0,
        };
        let schema = ns.schema();
        let mut processed: AHashSet<&'static str> = AHashSet::new();
        let mut base = BaseTagFilter::default();

        for tag in tags.iter().skip(skip) {
            if index == 0 && (base.accept(tag) || is_app_data_placeholder(tag)) {
                continue;
            }
            let name = mapping
                .get(&tag.code)
                .and_then(|names| names.iter().copied().find(|name| !processed.contains(name)));
            let Some(attr) = name.and_then(|name| schema.get(name)) else {
                unprocessed.push(tag.clone());
                continue;
            };
            if attr.is_computed() {
                processed.insert(attr.name);
                continue;
            }
            match attr.kind.coerce(tag.value.clone()) {
                Some(value) => {
                    processed.insert(attr.name);
                    if !attr.is_optional_default(&value) {
                        ns.unprotected_set(attr.name, value);
                    }
                }
                None => unprocessed.push(tag.clone()),
            }
        }

        if log {
            self.log_unprocessed(&unprocessed, index);
        }
        unprocessed
    }

    /// Log each tag at info level
    pub fn log_unprocessed(&self, tags: &Tags, index: usize) {
        let subclass = self.subclass_name(index).unwrap_or("<noclass>");
        let handle = self.handle.unwrap_or(Handle::NULL);
        for tag in tags.iter() {
            info!("ignored {} in subclass {} in entity #{}", tag, subclass, handle);
        }
    }
}

/// Recognizes the handle and the first owner tag of a base class
#[derive(Default)]
struct BaseTagFilter {
    handle_seen: bool,
    owner_seen: bool,
}

impl BaseTagFilter {
    fn accept(&mut self, tag: &Tag) -> bool {
        match tag.code {
            HANDLE_CODE | DIMSTYLE_HANDLE_CODE if !self.handle_seen => {
                self.handle_seen = true;
                matches!(tag.value, DxfValue::Handle(_))
            }
            OWNER_CODE if !self.owner_seen => {
                self.owner_seen = true;
                matches!(tag.value, DxfValue::Handle(_))
            }
            _ => false,
        }
    }
}

fn is_app_data_placeholder(tag: &Tag) -> bool {
    tag.code == APP_DATA_MARKER && matches!(tag.value, DxfValue::Int(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::attributes::{DxfAttr, DxfAttributes};
    use crate::entities::common::{acdb_entity, base_class};
    use once_cell::sync::Lazy;

    static DOUBLET_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
        DxfAttributes::new(vec![
            base_class(),
            acdb_entity(),
            DefSubclass::new(
                Some("AcDbDoublet"),
                vec![
                    DxfAttr::float("first", 40).default(0.0),
                    DxfAttr::float("second", 40).default(0.0),
                    DxfAttr::int("flags", 70).default(0).optional(),
                ],
            ),
        ])
    });

    fn load(text: &str, version: DxfVersion) -> (DxfNamespace, Vec<Tags>) {
        let xtags = ExtendedTags::from_text(text, version == DxfVersion::R12).unwrap();
        let processor = SubclassProcessor::new(&xtags, version).with_logging(false);
        let mut ns = DxfNamespace::new(&DOUBLET_SCHEMA, "DOUBLET");
        let mut unprocessed = vec![processor.load_base_class(&mut ns)];
        if processor.r12() {
            unprocessed[0] = processor.fast_load_dxfattribs(
                &mut ns,
                DOUBLET_SCHEMA.legacy_mapping(),
                0,
                false,
            );
        } else {
            for index in 1..DOUBLET_SCHEMA.subclasses().len() {
                let mapping = DOUBLET_SCHEMA.group_code_mapping(index).unwrap();
                unprocessed.push(processor.fast_load_dxfattribs(&mut ns, mapping, index, false));
            }
        }
        (ns, unprocessed)
    }

    #[test]
    fn test_doublets_and_unprocessed_tags() {
        let text = "0\nDOUBLET\n5\n1A\n330\n0\n100\nAcDbEntity\n8\nWALLS\n\
                    100\nAcDbDoublet\n40\n1.5\n40\n2.5\n40\n3.5\n999\nskipped\n71\n7\n";
        let (ns, unprocessed) = load(text, DxfVersion::R2000);
        assert_eq!(ns.handle(), Some(Handle::new(0x1A)));
        assert_eq!(ns.owner(), Handle::NULL);
        assert_eq!(ns.get("layer").unwrap(), Some(DxfValue::from("WALLS")));
        assert_eq!(ns.get("first").unwrap(), Some(DxfValue::Float(1.5)));
        assert_eq!(ns.get("second").unwrap(), Some(DxfValue::Float(2.5)));
        assert!(unprocessed[0].is_empty());
        assert!(unprocessed[1].is_empty());
        assert_eq!(
            unprocessed[2].as_slice(),
            &[Tag::new(40, 3.5), Tag::new(71, 7)]
        );
    }

    #[test]
    fn test_optional_default_not_stored_at_load() {
        let text = "0\nDOUBLET\n5\n1A\n100\nAcDbEntity\n8\n0\n100\nAcDbDoublet\n70\n0\n";
        let (ns, _) = load(text, DxfVersion::R2000);
        assert!(!ns.has("flags").unwrap());
        assert!(ns.has("layer").unwrap());
    }

    #[test]
    fn test_flat_layout() {
        let text = "0\nDOUBLET\n5\n2B\n8\nPIPES\n40\n1.0\n62\n1\n";
        let (ns, unprocessed) = load(text, DxfVersion::R12);
        assert_eq!(ns.handle(), Some(Handle::new(0x2B)));
        assert_eq!(ns.get("color").unwrap(), Some(DxfValue::Int(1)));
        assert_eq!(ns.get("first").unwrap(), Some(DxfValue::Float(1.0)));
        assert_eq!(unprocessed.len(), 1);
        assert!(unprocessed[0].is_empty());
    }

    #[test]
    fn test_subclass_names() {
        let xtags = ExtendedTags::from_text("0\nLINE\n5\n1\n100\nAcDbEntity\n100\nAcDbLine\n", false).unwrap();
        let processor = SubclassProcessor::new(&xtags, DxfVersion::R2000);
        assert!(!processor.r12());
        assert_eq!(processor.subclass_name(0), None);
        assert_eq!(processor.subclass_name(2), Some("AcDbLine"));
        assert_eq!(processor.dxftype(), "LINE");
    }
}
