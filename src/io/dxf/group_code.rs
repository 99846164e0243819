//! Group code classification
//!
//! The value kind of a tag is decided by its group code alone. The ranges
//! follow the DXF reference; anything not listed is a string.

/// Structure marker: `(0, SECTION)`, `(0, LINE)`, ...
pub const STRUCTURE_MARKER: i32 = 0;
/// Entity handle
pub const HANDLE_CODE: i32 = 5;
/// Entity handle used by DIMSTYLE
pub const DIMSTYLE_HANDLE_CODE: i32 = 105;
/// Subclass marker `(100, AcDbEntity)`
pub const SUBCLASS_MARKER: i32 = 100;
/// Embedded object marker `(101, Embedded Object)`
pub const EMBEDDED_OBJ_MARKER: i32 = 101;
/// Open and close tags of bracketed application data
pub const APP_DATA_MARKER: i32 = 102;
/// Owner handle, also used for reactor entries
pub const OWNER_CODE: i32 = 330;
/// Reactor entries inside `{ACAD_REACTORS`
pub const REACTOR_HANDLE_CODE: i32 = 330;
/// Extension dictionary pointer inside `{ACAD_XDICTIONARY`
pub const XDICT_HANDLE_CODE: i32 = 360;
/// Comment, skipped by the tokenizer
pub const COMMENT_MARKER: i32 = 999;
/// Start of an extended data block `(1001, APPID)`
pub const XDATA_MARKER: i32 = 1001;
/// Extended data list control string `{` / `}`
pub const XDATA_CONTROL_CODE: i32 = 1002;

pub const EMBEDDED_OBJ_STR: &str = "Embedded Object";
pub const ACAD_REACTORS: &str = "{ACAD_REACTORS";
pub const ACAD_XDICTIONARY: &str = "{ACAD_XDICTIONARY";

/// Binary chunks are written with at most this many bytes per tag.
pub const BINARY_CHUNK_SIZE: usize = 127;

/// The kind of value a group code carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 16/32/64 bit integers and booleans
    Int,
    /// Double precision float
    Float,
    /// Text
    Text,
    /// First coordinate of a point, followed by y (and optional z) tags
    Point,
    /// Hex encoded binary chunk
    Binary,
    /// Hex encoded handle or pointer
    Handle,
}

impl ValueKind {
    /// Get the value kind of a group code
    pub fn from_code(code: i32) -> ValueKind {
        if is_point_code(code) {
            return ValueKind::Point;
        }
        if is_binary_code(code) {
            return ValueKind::Binary;
        }
        if is_handle_code(code) {
            return ValueKind::Handle;
        }
        match code {
            60..=99 | 160..=179 | 270..=299 | 370..=389 | 400..=409 | 420..=429
            | 440..=459 | 1060..=1071 => ValueKind::Int,
            10..=59 | 110..=149 | 210..=239 | 460..=469 | 1010..=1059 => ValueKind::Float,
            _ => ValueKind::Text,
        }
    }
}

/// Codes starting a 2D/3D point: x at `code`, y at `code + 10`, z at `code + 20`
#[inline]
pub fn is_point_code(code: i32) -> bool {
    matches!(code, 10..=18 | 110..=112 | 210..=213 | 1010..=1013)
}

#[inline]
pub fn is_binary_code(code: i32) -> bool {
    matches!(code, 310..=319 | 1004)
}

/// Binary codes whose consecutive tags form one chunked value
#[inline]
pub fn is_chunked_binary_code(code: i32) -> bool {
    matches!(code, 310..=319)
}

#[inline]
pub fn is_handle_code(code: i32) -> bool {
    matches!(code, 5 | 105 | 320..=369 | 390..=399 | 480 | 481 | 1005)
}

/// Codes referencing other entities by handle
#[inline]
pub fn is_pointer_code(code: i32) -> bool {
    matches!(code, 320..=369 | 390..=399 | 480 | 481 | 1005)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(ValueKind::from_code(0), ValueKind::Text);
        assert_eq!(ValueKind::from_code(8), ValueKind::Text);
        assert_eq!(ValueKind::from_code(10), ValueKind::Point);
        assert_eq!(ValueKind::from_code(20), ValueKind::Float);
        assert_eq!(ValueKind::from_code(40), ValueKind::Float);
        assert_eq!(ValueKind::from_code(62), ValueKind::Int);
        assert_eq!(ValueKind::from_code(90), ValueKind::Int);
        assert_eq!(ValueKind::from_code(290), ValueKind::Int);
        assert_eq!(ValueKind::from_code(310), ValueKind::Binary);
        assert_eq!(ValueKind::from_code(330), ValueKind::Handle);
        assert_eq!(ValueKind::from_code(5), ValueKind::Handle);
        assert_eq!(ValueKind::from_code(1000), ValueKind::Text);
        assert_eq!(ValueKind::from_code(1010), ValueKind::Point);
        assert_eq!(ValueKind::from_code(1040), ValueKind::Float);
        assert_eq!(ValueKind::from_code(1071), ValueKind::Int);
    }

    #[test]
    fn test_code_sets() {
        assert!(is_pointer_code(1005));
        assert!(!is_pointer_code(5));
        assert!(is_chunked_binary_code(310));
        assert!(!is_chunked_binary_code(1004));
    }
}
