//! Typed tags and tag lists

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::group_code::{HANDLE_CODE, DIMSTYLE_HANDLE_CODE, STRUCTURE_MARKER};
use crate::types::{Handle, Vector2, Vector3};

/// A typed tag value, one variant per value kind
#[derive(Debug, Clone, PartialEq)]
pub enum DxfValue {
    Int(i64),
    Float(f64),
    Text(String),
    Point2(Vector2),
    Point3(Vector3),
    Binary(Vec<u8>),
    Handle(Handle),
}

impl DxfValue {
    /// Name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            DxfValue::Int(_) => "int",
            DxfValue::Float(_) => "float",
            DxfValue::Text(_) => "text",
            DxfValue::Point2(_) => "point2d",
            DxfValue::Point3(_) => "point3d",
            DxfValue::Binary(_) => "binary",
            DxfValue::Handle(_) => "handle",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            DxfValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value, integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DxfValue::Float(v) => Some(*v),
            DxfValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DxfValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Point value, 2D points get z = 0
    pub fn as_point3(&self) -> Option<Vector3> {
        match self {
            DxfValue::Point3(v) => Some(*v),
            DxfValue::Point2(v) => Some((*v).into()),
            _ => None,
        }
    }

    /// Handle value, hex strings are parsed
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            DxfValue::Handle(h) => Some(*h),
            DxfValue::Text(s) => Handle::parse_hex(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DxfValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for DxfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DxfValue::Int(v) => write!(f, "{}", v),
            DxfValue::Float(v) => write!(f, "{}", v),
            DxfValue::Text(s) => write!(f, "{:?}", s),
            DxfValue::Point2(v) => write!(f, "{}", v),
            DxfValue::Point3(v) => write!(f, "{}", v),
            DxfValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            DxfValue::Handle(h) => write!(f, "#{}", h),
        }
    }
}

impl From<i64> for DxfValue {
    fn from(v: i64) -> Self {
        DxfValue::Int(v)
    }
}

impl From<i32> for DxfValue {
    fn from(v: i32) -> Self {
        DxfValue::Int(v as i64)
    }
}

impl From<i16> for DxfValue {
    fn from(v: i16) -> Self {
        DxfValue::Int(v as i64)
    }
}

impl From<bool> for DxfValue {
    fn from(v: bool) -> Self {
        DxfValue::Int(v as i64)
    }
}

impl From<f64> for DxfValue {
    fn from(v: f64) -> Self {
        DxfValue::Float(v)
    }
}

impl From<&str> for DxfValue {
    fn from(v: &str) -> Self {
        DxfValue::Text(v.to_string())
    }
}

impl From<String> for DxfValue {
    fn from(v: String) -> Self {
        DxfValue::Text(v)
    }
}

impl From<Vector2> for DxfValue {
    fn from(v: Vector2) -> Self {
        DxfValue::Point2(v)
    }
}

impl From<Vector3> for DxfValue {
    fn from(v: Vector3) -> Self {
        DxfValue::Point3(v)
    }
}

impl From<(f64, f64, f64)> for DxfValue {
    fn from(v: (f64, f64, f64)) -> Self {
        DxfValue::Point3(v.into())
    }
}

impl From<Handle> for DxfValue {
    fn from(v: Handle) -> Self {
        DxfValue::Handle(v)
    }
}

impl From<Vec<u8>> for DxfValue {
    fn from(v: Vec<u8>) -> Self {
        DxfValue::Binary(v)
    }
}

/// An immutable (group code, value) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub code: i32,
    pub value: DxfValue,
}

impl Tag {
    pub fn new(code: i32, value: impl Into<DxfValue>) -> Self {
        Tag {
            code,
            value: value.into(),
        }
    }

    /// Text value or `None`
    pub fn text(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// True if this tag has the given code and text value
    pub fn is(&self, code: i32, text: &str) -> bool {
        self.code == code && self.value.as_str() == Some(text)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.code, self.value)
    }
}

/// An ordered tag list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Tags(Vec::new())
    }

    /// Structure name of an entity tag list, the value of the leading `(0, NAME)` tag
    pub fn dxftype(&self) -> Option<&str> {
        self.0
            .first()
            .filter(|tag| tag.code == STRUCTURE_MARKER)
            .and_then(Tag::text)
    }

    /// Entity handle from the first `(5, ...)` or `(105, ...)` tag
    pub fn get_handle(&self) -> Option<Handle> {
        self.0
            .iter()
            .find(|tag| tag.code == HANDLE_CODE || tag.code == DIMSTYLE_HANDLE_CODE)
            .and_then(|tag| tag.value.as_handle())
    }

    /// Index of the first tag with `code`
    pub fn tag_index(&self, code: i32) -> Option<usize> {
        self.0.iter().position(|tag| tag.code == code)
    }

    pub fn has_tag(&self, code: i32) -> bool {
        self.tag_index(code).is_some()
    }

    /// First tag with `code`
    pub fn get_first_tag(&self, code: i32) -> Option<&Tag> {
        self.0.iter().find(|tag| tag.code == code)
    }

    /// Value of the first tag with `code`
    pub fn get_first_value(&self, code: i32) -> Option<&DxfValue> {
        self.get_first_tag(code).map(|tag| &tag.value)
    }

    /// Replace the value of the first tag with `code`, or append a new tag.
    pub fn set_first(&mut self, tag: Tag) {
        match self.tag_index(tag.code) {
            Some(index) => self.0[index] = tag,
            None => self.0.push(tag),
        }
    }

    /// Remove all tags whose code is in `codes`
    pub fn remove_tags(&mut self, codes: &[i32]) {
        self.0.retain(|tag| !codes.contains(&tag.code));
    }

    pub fn into_inner(self) -> Vec<Tag> {
        self.0
    }
}

impl Deref for Tags {
    type Target = Vec<Tag>;

    fn deref(&self) -> &Vec<Tag> {
        &self.0
    }
}

impl DerefMut for Tags {
    fn deref_mut(&mut self) -> &mut Vec<Tag> {
        &mut self.0
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Tags(tags)
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Tags(iter.into_iter().collect())
    }
}

impl IntoIterator for Tags {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Split `tags` into groups, each group starts with a tag of `splitcode`.
///
/// Tags in front of the first split tag are dropped.
pub fn group_tags<I>(tags: I, splitcode: i32) -> Vec<Tags>
where
    I: IntoIterator<Item = Tag>,
{
    let mut groups = Vec::new();
    let mut current: Option<Tags> = None;
    for tag in tags {
        if tag.code == splitcode {
            if let Some(group) = current.take() {
                groups.push(group);
            }
            current = Some(Tags(vec![tag]));
        } else if let Some(group) = current.as_mut() {
            group.push(tag);
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_tags() -> Tags {
        Tags::from(vec![
            Tag::new(0, "LINE"),
            Tag::new(5, Handle::new(0x1A)),
            Tag::new(330, Handle::NULL),
            Tag::new(8, "0"),
        ])
    }

    #[test]
    fn test_tags_queries() {
        let tags = line_tags();
        assert_eq!(tags.dxftype(), Some("LINE"));
        assert_eq!(tags.get_handle(), Some(Handle::new(0x1A)));
        assert_eq!(tags.tag_index(8), Some(3));
        assert!(!tags.has_tag(62));
        assert_eq!(tags.get_first_value(8), Some(&DxfValue::from("0")));
    }

    #[test]
    fn test_set_first() {
        let mut tags = line_tags();
        tags.set_first(Tag::new(8, "WALLS"));
        tags.set_first(Tag::new(62, 1));
        assert_eq!(tags.get_first_value(8).and_then(DxfValue::as_str), Some("WALLS"));
        assert_eq!(tags.last(), Some(&Tag::new(62, 1)));
    }

    #[test]
    fn test_group_tags() {
        let tags = vec![
            Tag::new(8, "dropped"),
            Tag::new(0, "LINE"),
            Tag::new(8, "0"),
            Tag::new(0, "POINT"),
            Tag::new(0, "CIRCLE"),
            Tag::new(40, 1.0),
        ];
        let groups = group_tags(tags, 0);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert_eq!(groups[2].dxftype(), Some("CIRCLE"));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(DxfValue::Int(3).as_float(), Some(3.0));
        assert_eq!(DxfValue::from("FF").as_handle(), Some(Handle::new(255)));
        assert_eq!(
            DxfValue::Point2(Vector2::new(1.0, 2.0)).as_point3(),
            Some(Vector3::new(1.0, 2.0, 0.0))
        );
        assert_eq!(DxfValue::from(true), DxfValue::Int(1));
        assert_eq!(Tag::new(330, Handle::new(0x2F)).to_string(), "(330, #2F)");
    }
}
