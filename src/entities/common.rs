//! Schema fragments shared by several entity types

use super::attributes::{DefSubclass, DxfAttr};
use crate::types::DxfVersion;

/// Marker of the common graphical entity subclass
pub const ACDB_ENTITY: &str = "AcDbEntity";

/// Base class of every entity: handle and owner
pub fn base_class() -> DefSubclass {
    DefSubclass::new(
        None,
        vec![DxfAttr::handle("handle", 5), DxfAttr::handle("owner", 330)],
    )
}

/// Attributes of every graphical entity
pub fn acdb_entity() -> DefSubclass {
    DefSubclass::new(
        Some(ACDB_ENTITY),
        vec![
            DxfAttr::text("layer", 8).default("0"),
            DxfAttr::text("linetype", 6).default("BYLAYER").optional(),
            // 256 is BYLAYER
            DxfAttr::int("color", 62).default(256).optional(),
            DxfAttr::int("paperspace", 67).default(0).optional(),
            DxfAttr::int("lineweight", 370)
                .default(-1)
                .optional()
                .since(DxfVersion::R2000),
            DxfAttr::float("ltscale", 48)
                .default(1.0)
                .optional()
                .since(DxfVersion::R2000),
            DxfAttr::int("invisible", 60)
                .default(0)
                .optional()
                .since(DxfVersion::R2000),
            DxfAttr::int("true_color", 420).optional().since(DxfVersion::R2004),
            DxfAttr::text("color_name", 430).optional().since(DxfVersion::R2004),
            DxfAttr::int("transparency", 440).optional().since(DxfVersion::R2004),
            DxfAttr::int("shadow_mode", 284).optional().since(DxfVersion::R2007),
            DxfAttr::handle("material_handle", 347)
                .optional()
                .since(DxfVersion::R2007),
            DxfAttr::handle("visualstyle_handle", 348)
                .optional()
                .since(DxfVersion::R2010),
            DxfAttr::int("plotstyle_enum", 380)
                .default(1)
                .optional()
                .since(DxfVersion::R2007),
            DxfAttr::handle("plotstyle_handle", 390)
                .optional()
                .since(DxfVersion::R2007),
        ],
    )
}
