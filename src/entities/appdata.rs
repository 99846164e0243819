//! Application defined data: `(102, "{APPID") ... (102, "}")` blocks

use indexmap::IndexMap;

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::APP_DATA_MARKER;
use crate::io::dxf::writer::{DxfStreamWriter, DxfStreamWriterExt};
use crate::io::dxf::{Tag, Tags};

/// Key of an application data block, `"ACAD"` and `"{ACAD"` both map to `"{ACAD"`.
pub fn uniform_appid(appid: &str) -> String {
    if appid.starts_with('{') {
        appid.to_string()
    } else {
        format!("{{{}", appid)
    }
}

/// Application data blocks of one entity, in load order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppData {
    data: IndexMap<String, Tags>,
}

impl AppData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has(&self, appid: &str) -> bool {
        self.data.contains_key(&uniform_appid(appid))
    }

    /// The whole block including the open and close tags
    pub fn get(&self, appid: &str) -> Option<&Tags> {
        self.data.get(&uniform_appid(appid))
    }

    /// Store a complete block, replacing an existing block of the same
    /// application.
    pub fn set(&mut self, tags: Tags) -> Result<()> {
        let appid = validate_block(&tags)?;
        self.data.insert(appid, tags);
        Ok(())
    }

    /// Wrap `data` into a block for `appid`
    pub fn add<I>(&mut self, appid: &str, data: I) -> Result<()>
    where
        I: IntoIterator<Item = Tag>,
    {
        let appid = uniform_appid(appid);
        let mut tags = Tags::new();
        tags.push(Tag::new(APP_DATA_MARKER, appid.as_str()));
        tags.extend(data);
        tags.push(Tag::new(APP_DATA_MARKER, "}"));
        self.set(tags)
    }

    pub fn discard(&mut self, appid: &str) -> Option<Tags> {
        self.data.shift_remove(&uniform_appid(appid))
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
}

/// Application key of a bracketed block
fn validate_block(tags: &Tags) -> Result<String> {
    let appid = tags
        .first()
        .filter(|tag| tag.code == APP_DATA_MARKER)
        .and_then(Tag::text)
        .filter(|name| name.starts_with('{') && name.len() > 1);
    let closed = tags.len() > 1 && tags.last().map_or(false, |tag| tag.code == APP_DATA_MARKER);
    match appid {
        Some(appid) if closed => Ok(appid.to_string()),
        _ => Err(DxfError::StructureError(
            "Invalid application defined data structure.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_appid() {
        assert_eq!(uniform_appid("ACAD"), "{ACAD");
        assert_eq!(uniform_appid("{ACAD"), "{ACAD");
    }

    #[test]
    fn test_add_get_discard() {
        let mut appdata = AppData::new();
        appdata.add("MYAPP", vec![Tag::new(1, "text"), Tag::new(40, 1.5)]).unwrap();
        assert!(appdata.has("{MYAPP"));
        let block = appdata.get("MYAPP").unwrap();
        assert_eq!(block.len(), 4);
        assert_eq!(block[0], Tag::new(102, "{MYAPP"));
        assert_eq!(block[3], Tag::new(102, "}"));
        assert!(appdata.discard("MYAPP").is_some());
        assert!(appdata.is_empty());
    }

    #[test]
    fn test_malformed_block() {
        let mut appdata = AppData::new();
        let tags = Tags::from(vec![Tag::new(102, "{MYAPP"), Tag::new(1, "x")]);
        assert!(matches!(appdata.set(tags), Err(DxfError::StructureError(_))));
        let tags = Tags::from(vec![Tag::new(1, "x"), Tag::new(102, "}")]);
        assert!(appdata.set(tags).is_err());
    }
}
