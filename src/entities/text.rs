//! TEXT entity
//!
//! TEXT declares the subclass `AcDbText` twice, the second one holds only
//! the vertical alignment.

use once_cell::sync::Lazy;

use super::attributes::{DefSubclass, DxfAttr, DxfAttributes, NULLVEC, Z_AXIS};
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::io::dxf::DxfValue;
use crate::types::Vector3;

pub static TEXT_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        acdb_entity(),
        acdb_text(),
        DefSubclass::new(
            Some("AcDbText"),
            vec![DxfAttr::int("valign", 73).default(0).optional()],
        ),
    ])
});

/// Text attributes shared by TEXT and ATTRIB
pub fn acdb_text() -> DefSubclass {
    DefSubclass::new(
        Some("AcDbText"),
        vec![
            DxfAttr::float("thickness", 39).default(0.0).optional(),
            DxfAttr::point3d("insert", 10).default(NULLVEC),
            DxfAttr::float("height", 40).default(2.5),
            DxfAttr::text("text", 1).default(""),
            DxfAttr::float("rotation", 50).default(0.0).optional(),
            DxfAttr::float("width", 41).default(1.0).optional(),
            DxfAttr::float("oblique", 51).default(0.0).optional(),
            DxfAttr::text("style", 7).default("Standard").optional(),
            // 2 = backward, 4 = upside down
            DxfAttr::int("text_generation_flag", 71).default(0).optional(),
            DxfAttr::int("halign", 72).default(0).optional(),
            DxfAttr::point3d("align_point", 11).optional(),
            DxfAttr::point3d("extrusion", 210).default(Z_AXIS).optional(),
        ],
    )
}

impl DxfEntity {
    pub fn new_text(text: &str, insert: Vector3, height: f64) -> Self {
        let mut entity = DxfEntity::new(EntityKind::Text);
        entity.dxf.unprotected_set("text", DxfValue::from(text));
        entity.dxf.unprotected_set("insert", DxfValue::Point3(insert));
        entity.dxf.unprotected_set("height", DxfValue::Float(height));
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ExtendedTags;
    use crate::io::dxf::writer::DxfWriterConfiguration;
    use crate::io::dxf::Tags;
    use crate::types::DxfVersion;

    const TEXT: &str = "0\nTEXT\n5\n2A\n330\n1F\n100\nAcDbEntity\n8\n0\n100\nAcDbText\n\
                        10\n1.0\n20\n2.0\n30\n0.0\n40\n3.5\n1\nHello\n72\n1\n11\n5.0\n21\n2.0\n31\n0.0\n\
                        100\nAcDbText\n73\n2\n";

    #[test]
    fn test_repeated_subclass_name() {
        let xtags = ExtendedTags::from_text(TEXT, false).unwrap();
        let text = DxfEntity::load(&xtags, EntityKind::Text, DxfVersion::R2000, false).unwrap();
        assert_eq!(text.get("valign").unwrap(), Some(DxfValue::Int(2)));
        assert_eq!(text.get("halign").unwrap(), Some(DxfValue::Int(1)));
        assert_eq!(text.get_text("text").unwrap().as_deref(), Some("Hello"));

        let tags = text.to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R2000)).unwrap();
        assert_eq!(tags, Tags::from_text(TEXT).unwrap());
    }
}
