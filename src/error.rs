//! Error types for dxf-records

use std::io;
use thiserror::Error;

use crate::types::Handle;

/// Main error type for dxf-records operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred while reading or writing a tag stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed tag stream, section, subclass or bracketed block
    #[error("DXF structure error: {0}")]
    StructureError(String),

    /// Attribute name not declared by the entity schema
    #[error("Invalid DXF attribute \"{name}\" for entity {dxftype}")]
    UnknownAttribute { name: String, dxftype: String },

    /// Value can not be coerced to the declared attribute kind
    #[error("Type mismatch for attribute \"{name}\": expected {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// Handle lookup failed
    #[error("Handle not found: #{0}")]
    HandleNotFound(Handle),

    /// Handle is already bound to another entity
    #[error("Duplicate handle: #{0}")]
    DuplicateHandle(Handle),

    /// Handle string is not a valid hex value, or is the reserved "0"
    #[error("Invalid handle: \"{0}\"")]
    InvalidHandle(String),

    /// Lifecycle violation, e.g. binding a deleted entity
    #[error("Invalid entity state: {0}")]
    InvalidState(String),

    /// Target DXF version is lower than an entity's minimum version
    #[error("{entity} requires DXF version {required}, target is {target}")]
    VersionUnsupported {
        entity: String,
        required: String,
        target: String,
    },

    /// An attribute could not be serialized
    #[error("Export of attribute \"{attribute}\" failed for {entity}: {message}")]
    Export {
        entity: String,
        attribute: String,
        message: String,
    },

    /// Encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl DxfError {
    /// Prefix a structure error with the location it occurred in.
    ///
    /// Other error kinds pass through unchanged.
    pub fn with_context(self, context: impl AsRef<str>) -> Self {
        match self {
            DxfError::StructureError(msg) => {
                DxfError::StructureError(format!("{}: {}", context.as_ref(), msg))
            }
            other => other,
        }
    }
}

/// Result type alias for dxf-records operations
pub type Result<T> = std::result::Result<T, DxfError>;

impl From<String> for DxfError {
    fn from(s: String) -> Self {
        DxfError::Custom(s)
    }
}

impl From<&str> for DxfError {
    fn from(s: &str) -> Self {
        DxfError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DxfError::UnknownAttribute {
            name: "laier".to_string(),
            dxftype: "LINE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid DXF attribute \"laier\" for entity LINE"
        );
    }

    #[test]
    fn test_handle_errors() {
        let err = DxfError::HandleNotFound(Handle::new(0x1A));
        assert_eq!(err.to_string(), "Handle not found: #1A");
        let err = DxfError::DuplicateHandle(Handle::new(0xFF));
        assert!(err.to_string().contains("#FF"));
    }

    #[test]
    fn test_structure_context() {
        let err = DxfError::StructureError("Unexpected tag".into())
            .with_context("section ENTITIES, LINE #1A");
        assert_eq!(
            err.to_string(),
            "DXF structure error: section ENTITIES, LINE #1A: Unexpected tag"
        );

        let err = DxfError::HandleNotFound(Handle::new(1)).with_context("ignored");
        assert!(matches!(err, DxfError::HandleNotFound(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let dxf_err: DxfError = io_err.into();
        assert!(matches!(dxf_err, DxfError::Io(_)));
    }
}
