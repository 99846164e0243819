//! ARC entity

use once_cell::sync::Lazy;

use super::attributes::{ComputedAttribute, DefSubclass, DxfAttr, DxfAttributes};
use super::circle::acdb_circle;
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::error::{DxfError, Result};
use crate::io::dxf::DxfValue;
use crate::types::Vector3;

pub static ARC_SCHEMA: Lazy<DxfAttributes> =
    Lazy::new(|| DxfAttributes::new(vec![base_class(), acdb_entity(), acdb_circle(), acdb_arc()]));

/// Counter-clockwise angle from start to end in degrees, `(0, 360]`
struct ArcSpan;

static ARC_SPAN: ArcSpan = ArcSpan;

impl ComputedAttribute for ArcSpan {
    fn get(&self, entity: &DxfEntity) -> Result<Option<DxfValue>> {
        let start = angle(entity, "start_angle")?;
        let end = angle(entity, "end_angle")?;
        let span = (end - start).rem_euclid(360.0);
        Ok(Some(DxfValue::Float(if span == 0.0 { 360.0 } else { span })))
    }

    /// Moves the end angle, the start angle is kept
    fn set(&self, entity: &mut DxfEntity, value: DxfValue) -> Result<()> {
        let span = value.as_float().ok_or_else(|| DxfError::TypeMismatch {
            name: "span".to_string(),
            expected: "float".to_string(),
            found: value.kind_name().to_string(),
        })?;
        let start = angle(entity, "start_angle")?;
        entity.set("end_angle", (start + span).rem_euclid(360.0))
    }
}

fn angle(entity: &DxfEntity, name: &str) -> Result<f64> {
    Ok(entity.get(name)?.and_then(|value| value.as_float()).unwrap_or(0.0))
}

fn acdb_arc() -> DefSubclass {
    DefSubclass::new(
        Some("AcDbArc"),
        vec![
            DxfAttr::float("start_angle", 50).default(0.0),
            DxfAttr::float("end_angle", 51).default(360.0),
            DxfAttr::float("span", -1).computed(&ARC_SPAN),
        ],
    )
}

impl DxfEntity {
    /// New virtual ARC, angles in degrees
    pub fn new_arc(center: Vector3, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        let mut arc = DxfEntity::new(EntityKind::Arc);
        arc.dxf.unprotected_set("center", DxfValue::Point3(center));
        arc.dxf.unprotected_set("radius", DxfValue::Float(radius));
        arc.dxf.unprotected_set("start_angle", DxfValue::Float(start_angle));
        arc.dxf.unprotected_set("end_angle", DxfValue::Float(end_angle));
        arc
    }
}
