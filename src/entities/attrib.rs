//! ATTRIB entity, a text attached to a block reference

use once_cell::sync::Lazy;

use super::attributes::{DefSubclass, DxfAttr, DxfAttributes};
use super::common::{acdb_entity, base_class};
use super::text::acdb_text;
use crate::types::DxfVersion;

/// `AcDbAttribute` uses group code 280 twice: the first occurrence is the
/// class version, the second the lock position flag.
pub static ATTRIB_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        acdb_entity(),
        acdb_text(),
        DefSubclass::new(
            Some("AcDbAttribute"),
            vec![
                DxfAttr::int("version", 280).default(0).since(DxfVersion::R2010),
                DxfAttr::text("tag", 2).default(""),
                DxfAttr::int("flags", 70).default(0),
                DxfAttr::int("field_length", 73).default(0).optional(),
                DxfAttr::int("valign", 74).default(0).optional(),
                DxfAttr::int("lock_position", 280)
                    .default(0)
                    .optional()
                    .since(DxfVersion::R2010),
            ],
        ),
    ])
});
