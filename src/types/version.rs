//! DXF file format versions

use std::fmt;
use std::str::FromStr;

use crate::error::DxfError;

/// DXF format version, ordered from oldest to newest.
///
/// The variant names are the `$ACADVER` header values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DxfVersion {
    /// R12, the legacy layout without subclass markers
    AC1009,
    /// R13
    AC1012,
    /// R14
    AC1014,
    /// R2000
    AC1015,
    /// R2004
    AC1018,
    /// R2007
    AC1021,
    /// R2010
    AC1024,
    /// R2013
    AC1027,
    /// R2018
    AC1032,
}

impl DxfVersion {
    pub const R12: DxfVersion = DxfVersion::AC1009;
    pub const R2000: DxfVersion = DxfVersion::AC1015;
    pub const R2004: DxfVersion = DxfVersion::AC1018;
    pub const R2007: DxfVersion = DxfVersion::AC1021;
    pub const R2010: DxfVersion = DxfVersion::AC1024;
    pub const R2013: DxfVersion = DxfVersion::AC1027;
    pub const R2018: DxfVersion = DxfVersion::AC1032;

    /// Newest supported version, used for new documents
    pub const LATEST: DxfVersion = DxfVersion::AC1032;

    /// Parse an `$ACADVER` value like `"AC1015"`.
    ///
    /// Older versions than R12 map to R12, they share its flat layout.
    pub fn from_version_string(s: &str) -> Option<DxfVersion> {
        let version = match s.trim().to_ascii_uppercase().as_str() {
            "AC1009" | "AC1006" | "AC1004" | "AC1002" => DxfVersion::AC1009,
            "AC1012" => DxfVersion::AC1012,
            "AC1014" => DxfVersion::AC1014,
            "AC1015" => DxfVersion::AC1015,
            "AC1018" => DxfVersion::AC1018,
            "AC1021" => DxfVersion::AC1021,
            "AC1024" => DxfVersion::AC1024,
            "AC1027" => DxfVersion::AC1027,
            "AC1032" => DxfVersion::AC1032,
            _ => return None,
        };
        Some(version)
    }

    /// The `$ACADVER` string
    pub fn as_str(&self) -> &'static str {
        match self {
            DxfVersion::AC1009 => "AC1009",
            DxfVersion::AC1012 => "AC1012",
            DxfVersion::AC1014 => "AC1014",
            DxfVersion::AC1015 => "AC1015",
            DxfVersion::AC1018 => "AC1018",
            DxfVersion::AC1021 => "AC1021",
            DxfVersion::AC1024 => "AC1024",
            DxfVersion::AC1027 => "AC1027",
            DxfVersion::AC1032 => "AC1032",
        }
    }

    /// Release name like `"R2000"`
    pub fn release(&self) -> &'static str {
        match self {
            DxfVersion::AC1009 => "R12",
            DxfVersion::AC1012 => "R13",
            DxfVersion::AC1014 => "R14",
            DxfVersion::AC1015 => "R2000",
            DxfVersion::AC1018 => "R2004",
            DxfVersion::AC1021 => "R2007",
            DxfVersion::AC1024 => "R2010",
            DxfVersion::AC1027 => "R2013",
            DxfVersion::AC1032 => "R2018",
        }
    }

    /// R12 entities carry no subclass markers and no owner handles
    pub fn is_legacy(&self) -> bool {
        *self <= DxfVersion::AC1009
    }
}

impl Default for DxfVersion {
    fn default() -> Self {
        DxfVersion::LATEST
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.release())
    }
}

impl FromStr for DxfVersion {
    type Err = DxfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DxfVersion::from_version_string(s)
            .ok_or_else(|| DxfError::Custom(format!("Unsupported DXF version: {}", s)))
    }
}
