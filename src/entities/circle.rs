//! CIRCLE entity

use once_cell::sync::Lazy;

use super::attributes::{DefSubclass, DxfAttr, DxfAttributes, NULLVEC, Z_AXIS};
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::io::dxf::DxfValue;
use crate::types::Vector3;

pub static CIRCLE_SCHEMA: Lazy<DxfAttributes> =
    Lazy::new(|| DxfAttributes::new(vec![base_class(), acdb_entity(), acdb_circle()]));

/// Shared by CIRCLE and ARC
pub fn acdb_circle() -> DefSubclass {
    DefSubclass::new(
        Some("AcDbCircle"),
        vec![
            DxfAttr::float("thickness", 39).default(0.0).optional(),
            DxfAttr::point3d("center", 10).default(NULLVEC),
            DxfAttr::float("radius", 40).default(1.0),
            DxfAttr::point3d("extrusion", 210).default(Z_AXIS).optional(),
        ],
    )
}

impl DxfEntity {
    pub fn new_circle(center: Vector3, radius: f64) -> Self {
        let mut circle = DxfEntity::new(EntityKind::Circle);
        circle.dxf.unprotected_set("center", DxfValue::Point3(center));
        circle.dxf.unprotected_set("radius", DxfValue::Float(radius));
        circle
    }
}
