//! Handle type for DXF entities
//!
//! Handles are unique identifiers for all entities in a document. In the tag
//! stream they appear as upper-case base-16 strings without prefix.

use std::fmt;
use std::str::FromStr;

use crate::error::DxfError;

/// A unique identifier for DXF entities
///
/// Handle `0` is reserved: as owner it means "no owner", and it is never
/// bound to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The null handle (0)
    pub const NULL: Handle = Handle(0);

    /// Create a new handle from a u64 value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if this is the null handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Check if this handle can be bound to an entity
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Parse a hex string like `"1A"`, returns `None` for anything else.
    pub fn parse_hex(s: &str) -> Option<Handle> {
        let s = s.trim();
        if s.is_empty() || s.len() > 16 {
            return None;
        }
        u64::from_str_radix(s, 16).ok().map(Handle)
    }

    /// The handle following this one
    #[inline]
    pub const fn next(&self) -> Handle {
        Handle(self.0 + 1)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl FromStr for Handle {
    type Err = DxfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::parse_hex(s).ok_or_else(|| DxfError::InvalidHandle(s.to_string()))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl fmt::LowerHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}
