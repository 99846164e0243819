//! POINT entity

use once_cell::sync::Lazy;

use super::attributes::{DefSubclass, DxfAttr, DxfAttributes, NULLVEC, Z_AXIS};
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::io::dxf::DxfValue;
use crate::types::Vector3;

pub static POINT_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        acdb_entity(),
        DefSubclass::new(
            Some("AcDbPoint"),
            vec![
                DxfAttr::point3d("location", 10).default(NULLVEC),
                DxfAttr::float("thickness", 39).default(0.0).optional(),
                DxfAttr::point3d("extrusion", 210).default(Z_AXIS).optional(),
                // x-axis angle of the UCS in effect when the point was drawn
                DxfAttr::float("angle", 50).default(0.0).optional(),
            ],
        ),
    ])
});

impl DxfEntity {
    pub fn new_point(location: Vector3) -> Self {
        let mut point = DxfEntity::new(EntityKind::Point);
        point.dxf.unprotected_set("location", DxfValue::Point3(location));
        point
    }
}
