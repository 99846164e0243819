//! LINE entity

use once_cell::sync::Lazy;

use super::attributes::{DefSubclass, DxfAttr, DxfAttributes, NULLVEC, Z_AXIS};
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::io::dxf::DxfValue;
use crate::types::Vector3;

pub static LINE_SCHEMA: Lazy<DxfAttributes> =
    Lazy::new(|| DxfAttributes::new(vec![base_class(), acdb_entity(), acdb_line()]));

fn acdb_line() -> DefSubclass {
    DefSubclass::new(
        Some("AcDbLine"),
        vec![
            DxfAttr::point3d("start", 10).default(NULLVEC),
            DxfAttr::point3d("end", 11).default(NULLVEC),
            DxfAttr::float("thickness", 39).default(0.0).optional(),
            DxfAttr::point3d("extrusion", 210).default(Z_AXIS).optional(),
        ],
    )
}

impl DxfEntity {
    /// New virtual LINE from `start` to `end`
    pub fn new_line(start: Vector3, end: Vector3) -> Self {
        let mut line = DxfEntity::new(EntityKind::Line);
        line.dxf.unprotected_set("start", DxfValue::Point3(start));
        line.dxf.unprotected_set("end", DxfValue::Point3(end));
        line
    }
}
