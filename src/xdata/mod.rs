//! Extended data (XDATA)
//!
//! Application specific data attached to an entity, stored with group codes
//! 1000-1071. Each block starts with `(1001, APPID)`.

use indexmap::IndexMap;

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{XDATA_CONTROL_CODE, XDATA_MARKER};
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::io::dxf::{Tag, Tags};

/// Code of the list name in a named xdata list
const XLIST_NAME_CODE: i32 = 1000;

/// Extended data blocks keyed by application name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XData {
    data: IndexMap<String, Tags>,
}

impl XData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from partitioned blocks, a later block replaces an earlier one
    /// of the same application.
    pub fn from_blocks<I: IntoIterator<Item = Tags>>(blocks: I) -> Result<Self> {
        let mut xdata = Self::new();
        for tags in blocks {
            let appid = block_appid(&tags)?;
            validate_codes(tags.iter().skip(1))?;
            xdata.data.insert(appid, tags);
        }
        Ok(xdata)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_xdata(&self, appid: &str) -> bool {
        self.data.contains_key(appid)
    }

    /// Block of `appid` including the leading `(1001, APPID)` tag
    pub fn get(&self, appid: &str) -> Option<&Tags> {
        self.data.get(appid)
    }

    /// Set the data of `appid`, replacing existing data.
    pub fn add<I>(&mut self, appid: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut data = Tags::new();
        data.push(Tag::new(XDATA_MARKER, appid));
        data.extend(tags);
        validate_codes(data.iter().skip(1))?;
        self.data.insert(appid.to_string(), data);
        Ok(())
    }

    pub fn discard(&mut self, appid: &str) -> Option<Tags> {
        self.data.shift_remove(appid)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tags)> + '_ {
        self.data.iter().map(|(appid, tags)| (appid.as_str(), tags))
    }

    pub fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        for tags in self.data.values() {
            writer.write_tags(tags)?;
        }
        Ok(())
    }

    pub fn has_xlist(&self, appid: &str, name: &str) -> bool {
        matches!(self.get_xlist(appid, name), Ok(Some(_)))
    }

    /// Content of the named list `(1000, name) (1002, "{") ... (1002, "}")`
    /// without the name and outer braces. Nested lists are returned as is.
    pub fn get_xlist(&self, appid: &str, name: &str) -> Result<Option<Tags>> {
        let Some(tags) = self.data.get(appid) else {
            return Ok(None);
        };
        Ok(find_xlist(tags, name)?.map(|(start, end)| Tags::from(tags[start + 2..end].to_vec())))
    }

    /// Replace or append the named list `name` of `appid`.
    pub fn set_xlist<I>(&mut self, appid: &str, name: &str, content: I) -> Result<()>
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut list = vec![
            Tag::new(XLIST_NAME_CODE, name),
            Tag::new(XDATA_CONTROL_CODE, "{"),
        ];
        list.extend(content);
        list.push(Tag::new(XDATA_CONTROL_CODE, "}"));
        validate_codes(list.iter())?;

        let tags = self
            .data
            .entry(appid.to_string())
            .or_insert_with(|| Tags::from(vec![Tag::new(XDATA_MARKER, appid)]));
        match find_xlist(tags, name)? {
            Some((start, end)) => {
                tags.splice(start..=end, list);
            }
            None => tags.extend(list),
        }
        Ok(())
    }

    /// Remove the named list, returns `true` if it existed.
    pub fn discard_xlist(&mut self, appid: &str, name: &str) -> Result<bool> {
        let Some(tags) = self.data.get_mut(appid) else {
            return Ok(false);
        };
        match find_xlist(tags, name)? {
            Some((start, end)) => {
                tags.drain(start..=end);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn block_appid(tags: &Tags) -> Result<String> {
    tags.first()
        .filter(|tag| tag.code == XDATA_MARKER)
        .and_then(Tag::text)
        .map(str::to_string)
        .ok_or_else(|| DxfError::StructureError("Invalid XDATA structure.".to_string()))
}

fn validate_codes<'a>(tags: impl Iterator<Item = &'a Tag>) -> Result<()> {
    for tag in tags {
        if tag.code < 1000 || tag.code == XDATA_MARKER {
            return Err(DxfError::StructureError(format!(
                "Invalid XDATA tag {}",
                tag
            )));
        }
    }
    Ok(())
}

/// Index of the name tag and of the matching closing brace
fn find_xlist(tags: &Tags, name: &str) -> Result<Option<(usize, usize)>> {
    let Some(start) = tags.iter().position(|tag| tag.is(XLIST_NAME_CODE, name)) else {
        return Ok(None);
    };
    if !tags.get(start + 1).map_or(false, |tag| tag.is(XDATA_CONTROL_CODE, "{")) {
        return Err(DxfError::StructureError(format!(
            "Invalid XDATA list structure \"{}\".",
            name
        )));
    }
    let mut depth = 0usize;
    for (index, tag) in tags.iter().enumerate().skip(start + 1) {
        if tag.code != XDATA_CONTROL_CODE {
            continue;
        }
        match tag.text() {
            Some("{") => depth += 1,
            Some("}") => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some((start, index)));
                }
            }
            _ => {}
        }
    }
    Err(DxfError::StructureError(format!(
        "Missing closing (1002, '}}') tag in XDATA list \"{}\".",
        name
    )))
}
