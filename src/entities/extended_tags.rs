//! Subclass partitioner
//!
//! Splits the tags of one entity into the base class, ordered subclasses,
//! application data blocks, embedded objects and extended data blocks.

use log::debug;

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{
    APP_DATA_MARKER, EMBEDDED_OBJ_MARKER, EMBEDDED_OBJ_STR, SUBCLASS_MARKER, XDATA_MARKER,
};
use crate::io::dxf::{DxfValue, Tag, Tags};
use crate::types::Handle;

/// One entity's tags, partitioned
///
/// `subclasses[0]` is the base class: the structure tag, handle, owner and
/// placeholders `(102, Int(index))` marking where each application data
/// block of `appdata` was found.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendedTags {
    pub subclasses: Vec<Tags>,
    pub appdata: Vec<Tags>,
    pub xdata: Vec<Tags>,
    pub embedded_objects: Option<Vec<Tags>>,
}

fn is_embedded_object_marker(tag: &Tag) -> bool {
    tag.is(EMBEDDED_OBJ_MARKER, EMBEDDED_OBJ_STR)
}

fn is_end_of_class(tag: &Tag) -> bool {
    match tag.code {
        SUBCLASS_MARKER | XDATA_MARKER => true,
        EMBEDDED_OBJ_MARKER => is_embedded_object_marker(tag),
        _ => false,
    }
}

fn is_app_data_marker(tag: &Tag) -> bool {
    tag.code == APP_DATA_MARKER && tag.text().map_or(false, |s| s.starts_with('{'))
}

impl ExtendedTags {
    /// Partition `tags`; `legacy` flattens all subclasses into one group.
    pub fn from_tags<I>(tags: I, legacy: bool) -> Result<Self>
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut xtags = ExtendedTags::default();
        let mut tags = tags.into_iter();

        let mut next = xtags.collect_base_class(&mut tags)?;
        while let Some(tag) = next.take() {
            if tag.code == SUBCLASS_MARKER {
                next = xtags.collect_subclass(tag, &mut tags);
            } else {
                next = Some(tag);
                break;
            }
        }
        while let Some(tag) = next.take() {
            if is_embedded_object_marker(&tag) {
                next = xtags.collect_embedded_object(tag, &mut tags);
            } else {
                next = Some(tag);
                break;
            }
        }
        while let Some(tag) = next.take() {
            if tag.code == XDATA_MARKER {
                next = xtags.collect_xdata(tag, &mut tags);
            } else {
                return Err(DxfError::StructureError(format!(
                    "Unexpected tag {} at end of entity",
                    tag
                )));
            }
        }

        if legacy {
            xtags.legacy_repair();
        }
        Ok(xtags)
    }

    /// Partition DXF text of a single entity
    pub fn from_text(text: &str, legacy: bool) -> Result<Self> {
        Self::from_tags(Tags::from_text(text)?, legacy)
    }

    fn collect_base_class(&mut self, tags: &mut impl Iterator<Item = Tag>) -> Result<Option<Tag>> {
        let mut data = Tags::new();
        let mut end_tag = None;
        while let Some(tag) = tags.next() {
            if is_app_data_marker(&tag) {
                data.push(Tag::new(APP_DATA_MARKER, self.appdata.len() as i64));
                self.collect_app_data(tag, tags)?;
            } else if is_end_of_class(&tag) {
                end_tag = Some(tag);
                break;
            } else {
                data.push(tag);
            }
        }
        self.subclasses.push(data);
        Ok(end_tag)
    }

    fn collect_subclass(&mut self, start: Tag, tags: &mut impl Iterator<Item = Tag>) -> Option<Tag> {
        let mut data = Tags::from(vec![start]);
        for tag in tags {
            if is_end_of_class(&tag) {
                self.subclasses.push(data);
                return Some(tag);
            }
            data.push(tag);
        }
        self.subclasses.push(data);
        None
    }

    /// The first `(102, "}")` or `(102, "NAME}")` closes the block, there is
    /// no nesting.
    fn collect_app_data(&mut self, start: Tag, tags: &mut impl Iterator<Item = Tag>) -> Result<()> {
        let name = start.text().unwrap_or("{").trim_start_matches('{').to_string();
        let alternative_close = format!("{}}}", name);
        let mut data = Tags::from(vec![start]);
        for tag in tags {
            let closes = tag.code == APP_DATA_MARKER
                && matches!(tag.text(), Some(s) if s == "}" || s == alternative_close);
            data.push(tag);
            if closes {
                self.appdata.push(data);
                return Ok(());
            }
        }
        Err(DxfError::StructureError(
            "Missing closing (102, '}') tag in appdata structure.".to_string(),
        ))
    }

    fn collect_embedded_object(&mut self, start: Tag, tags: &mut impl Iterator<Item = Tag>) -> Option<Tag> {
        let mut data = Tags::from(vec![start]);
        let mut end_tag = None;
        for tag in tags {
            if is_embedded_object_marker(&tag) || tag.code == XDATA_MARKER {
                end_tag = Some(tag);
                break;
            }
            data.push(tag);
        }
        self.embedded_objects.get_or_insert_with(Vec::new).push(data);
        end_tag
    }

    fn collect_xdata(&mut self, start: Tag, tags: &mut impl Iterator<Item = Tag>) -> Option<Tag> {
        let mut data = Tags::from(vec![start]);
        for tag in tags {
            if tag.code == XDATA_MARKER {
                self.xdata.push(data);
                return Some(tag);
            }
            data.push(tag);
        }
        self.xdata.push(data);
        None
    }

    /// R12 handling: flatten subclasses, drop embedded objects.
    pub fn legacy_repair(&mut self) {
        self.flatten_subclasses();
        if !self.appdata.is_empty() {
            debug!("Found application defined entity data in DXF R12 <{}>", self.entity_name());
        }
        if self.embedded_objects.take().is_some() {
            debug!("Found embedded object in DXF R12 <{}>", self.entity_name());
        }
    }

    /// Merge all subclasses into the base class, dropping the subclass markers.
    pub fn flatten_subclasses(&mut self) {
        if self.subclasses.len() < 2 {
            return;
        }
        let mut subclasses = std::mem::take(&mut self.subclasses).into_iter();
        let mut noclass = subclasses.next().unwrap_or_default();
        for subclass in subclasses {
            noclass.extend(subclass.into_inner().into_iter().skip(1));
        }
        self.subclasses = vec![noclass];
        debug!("Removed subclass markers from entity for DXF R12 <{}>", self.entity_name());
    }

    /// The base class
    pub fn noclass(&self) -> Option<&Tags> {
        self.subclasses.first()
    }

    /// Entity type like `"LINE"`
    pub fn dxftype(&self) -> Option<&str> {
        self.subclasses.first().and_then(Tags::dxftype)
    }

    /// Entity handle from the base class
    pub fn get_handle(&self) -> Option<Handle> {
        self.subclasses.first().and_then(Tags::get_handle)
    }

    /// Entity type and handle for diagnostics, like `"LINE(#1A)"`
    pub fn entity_name(&self) -> String {
        let dxftype = self.dxftype().unwrap_or("UNKNOWN");
        match self.get_handle() {
            Some(handle) => format!("{}(#{})", dxftype, handle),
            None => dxftype.to_string(),
        }
    }

    /// First subclass named `name` at index `pos` or later
    pub fn get_subclass(&self, name: &str, pos: usize) -> Option<&Tags> {
        self.subclasses
            .iter()
            .skip(pos)
            .find(|subclass| subclass.first().map_or(false, |tag| tag.is(SUBCLASS_MARKER, name)))
    }

    pub fn has_subclass(&self, name: &str) -> bool {
        self.get_subclass(name, 0).is_some()
    }

    /// Application data block for `appid`, with or without leading `{`
    pub fn get_app_data(&self, appid: &str) -> Option<&Tags> {
        let key = super::appdata::uniform_appid(appid);
        self.appdata
            .iter()
            .find(|block| block.first().and_then(Tag::text) == Some(key.as_str()))
    }

    /// Extended data block for `appid`
    pub fn get_xdata(&self, appid: &str) -> Option<&Tags> {
        self.xdata
            .iter()
            .find(|block| block.first().and_then(Tag::text) == Some(appid))
    }

    pub fn has_xdata(&self, appid: &str) -> bool {
        self.get_xdata(appid).is_some()
    }

    /// All tags in stream order with application data restored in place
    pub fn iter_tags(&self) -> impl Iterator<Item = &Tag> + '_ {
        let subclass_tags = self.subclasses.iter().flat_map(move |subclass| {
            subclass.iter().flat_map(move |tag| {
                let block = match (&tag.value, tag.code) {
                    (DxfValue::Int(index), APP_DATA_MARKER) => self.appdata.get(*index as usize),
                    _ => None,
                };
                match block {
                    Some(block) => block.iter().collect::<Vec<_>>(),
                    None => vec![tag],
                }
            })
        });
        let embedded = self.embedded_objects.iter().flatten().flat_map(|tags| tags.iter());
        subclass_tags
            .chain(embedded)
            .chain(self.xdata.iter().flat_map(|tags| tags.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "0\nLINE\n5\n1A\n102\n{ACAD_REACTORS\n330\n2F\n102\n}\n330\n1F\n\
        100\nAcDbEntity\n8\n0\n100\nAcDbLine\n10\n0\n20\n0\n30\n0\n11\n1\n21\n0\n31\n0\n\
        1001\nEZDXF\n1000\ntext\n1001\nACME\n1070\n1\n";

    #[test]
    fn test_partition_modern_entity() {
        let xtags = ExtendedTags::from_text(LINE, false).unwrap();
        assert_eq!(xtags.subclasses.len(), 3);
        assert_eq!(xtags.dxftype(), Some("LINE"));
        assert_eq!(xtags.get_handle(), Some(Handle::new(0x1A)));
        assert_eq!(xtags.appdata.len(), 1);
        assert_eq!(xtags.appdata[0].len(), 3);
        assert_eq!(xtags.noclass().unwrap()[2], Tag::new(102, 0i64));
        assert!(xtags.has_subclass("AcDbLine"));
        assert_eq!(xtags.xdata.len(), 2);
        assert!(xtags.has_xdata("ACME"));
        assert!(xtags.get_app_data("ACAD_REACTORS").is_some());
    }

    #[test]
    fn test_iter_tags_restores_stream_order() {
        let tags = Tags::from_text(LINE).unwrap();
        let xtags = ExtendedTags::from_tags(tags.clone(), false).unwrap();
        let restored: Vec<Tag> = xtags.iter_tags().cloned().collect();
        assert_eq!(restored, tags.into_inner());
    }

    #[test]
    fn test_legacy_without_markers() {
        let xtags = ExtendedTags::from_text("0\nLINE\n5\n1A\n8\n0\n10\n0\n20\n0\n", false).unwrap();
        assert_eq!(xtags.subclasses.len(), 1);
        assert_eq!(xtags.noclass().unwrap().len(), 4);
    }

    #[test]
    fn test_legacy_flattening() {
        let xtags = ExtendedTags::from_text(LINE, true).unwrap();
        assert_eq!(xtags.subclasses.len(), 1);
        assert!(!xtags.noclass().unwrap().iter().any(|tag| tag.code == SUBCLASS_MARKER));
        assert!(xtags.noclass().unwrap().has_tag(11));
    }

    #[test]
    fn test_alternative_close_tag() {
        let xtags = ExtendedTags::from_text(
            "0\nLINE\n102\n{ACME\n1\ninner\n102\n{nested\n102\nACME}\n8\n0\n",
            false,
        )
        .unwrap();
        assert_eq!(xtags.appdata.len(), 1);
        // the inner open tag is an ordinary tag of the block
        assert_eq!(xtags.appdata[0].len(), 4);
        assert_eq!(xtags.noclass().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_app_data_close() {
        let err = ExtendedTags::from_text("0\nLINE\n102\n{ACME\n1\ndata\n", false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "DXF structure error: Missing closing (102, '}') tag in appdata structure."
        );
    }

    #[test]
    fn test_embedded_object() {
        let xtags = ExtendedTags::from_text(
            "0\nMTEXT\n100\nAcDbEntity\n8\n0\n101\nEmbedded Object\n70\n1\n1001\nACME\n",
            false,
        )
        .unwrap();
        let embedded = xtags.embedded_objects.as_ref().unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].len(), 2);
        assert_eq!(xtags.xdata.len(), 1);
    }

    #[test]
    fn test_repeated_subclass_names() {
        let xtags = ExtendedTags::from_text(
            "0\nTEXT\n100\nAcDbEntity\n100\nAcDbText\n1\nabc\n100\nAcDbText\n73\n2\n",
            false,
        )
        .unwrap();
        assert_eq!(xtags.subclasses.len(), 4);
        assert_eq!(xtags.get_subclass("AcDbText", 3).map(|s| s.len()), Some(2));
    }
}
