//! Lightweight polyline entity (2D polyline with bulges)
//!
//! The vertices are not attributes: they follow the `AcDbPolyline`
//! attributes as a repeated `10, [91], [40], [41], [42]` tag sequence.

use once_cell::sync::Lazy;

use super::attributes::{ComputedAttribute, DefSubclass, DxfAttr, DxfAttributes, Z_AXIS};
use super::common::{acdb_entity, base_class};
use super::{DxfEntity, EntityKind};
use crate::error::Result;
use crate::io::dxf::writer::DxfStreamWriter;
use crate::io::dxf::{DxfValue, Tags};
use crate::types::Vector2;

pub static LWPOLYLINE_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        acdb_entity(),
        DefSubclass::new(
            Some("AcDbPolyline"),
            vec![
                DxfAttr::int("count", 90).computed(&VERTEX_COUNT),
                // 1 = closed, 128 = continuous linetype pattern
                DxfAttr::int("flags", 70).default(0),
                DxfAttr::float("const_width", 43).default(0.0).optional(),
                DxfAttr::float("elevation", 38).default(0.0).optional(),
                DxfAttr::float("thickness", 39).default(0.0).optional(),
                DxfAttr::point3d("extrusion", 210).default(Z_AXIS).optional(),
            ],
        ),
    ])
});

/// Written after the vertices
pub(super) const TRAILING_ATTRIBS: &[&str] = &["extrusion"];

pub const CLOSED: i64 = 1;

const VERTEX_CODE: i32 = 10;
const START_WIDTH_CODE: i32 = 40;
const END_WIDTH_CODE: i32 = 41;
const BULGE_CODE: i32 = 42;
const VERTEX_ID_CODE: i32 = 91;

struct VertexCount;

static VERTEX_COUNT: VertexCount = VertexCount;

impl ComputedAttribute for VertexCount {
    fn get(&self, entity: &DxfEntity) -> Result<Option<DxfValue>> {
        Ok(match entity.kind() {
            EntityKind::LwPolyline(data) => Some(DxfValue::Int(data.vertices.len() as i64)),
            _ => None,
        })
    }
}

/// A vertex in a lightweight polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LwVertex {
    pub location: Vector2,
    pub start_width: Option<f64>,
    pub end_width: Option<f64>,
    /// tan(included angle / 4), 0 for straight segments
    pub bulge: f64,
    /// Written for R2010 and later
    pub id: Option<i64>,
}

impl LwVertex {
    pub fn new(location: Vector2) -> Self {
        LwVertex {
            location,
            start_width: None,
            end_width: None,
            bulge: 0.0,
            id: None,
        }
    }

    pub fn with_bulge(location: Vector2, bulge: f64) -> Self {
        LwVertex {
            bulge,
            ..Self::new(location)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LwPolylineData {
    pub vertices: Vec<LwVertex>,
}

impl LwPolylineData {
    /// Take the vertex tags out of `tags`, other tags stay.
    pub(super) fn load(&mut self, tags: &mut Tags) -> Result<()> {
        let mut remaining = Tags::new();
        for tag in std::mem::take(tags) {
            let has_vertex = !self.vertices.is_empty();
            let consumed = match (tag.code, &tag.value) {
                (VERTEX_CODE, DxfValue::Point2(point)) => {
                    self.vertices.push(LwVertex::new(*point));
                    true
                }
                (VERTEX_CODE, DxfValue::Point3(point)) => {
                    self.vertices.push(LwVertex::new(point.xy()));
                    true
                }
                (START_WIDTH_CODE, DxfValue::Float(width)) if has_vertex => {
                    self.last_vertex().start_width = Some(*width);
                    true
                }
                (END_WIDTH_CODE, DxfValue::Float(width)) if has_vertex => {
                    self.last_vertex().end_width = Some(*width);
                    true
                }
                (BULGE_CODE, DxfValue::Float(bulge)) if has_vertex => {
                    self.last_vertex().bulge = *bulge;
                    true
                }
                (VERTEX_ID_CODE, DxfValue::Int(id)) if has_vertex => {
                    self.last_vertex().id = Some(*id);
                    true
                }
                _ => false,
            };
            if !consumed {
                remaining.push(tag);
            }
        }
        *tags = remaining;
        Ok(())
    }

    fn last_vertex(&mut self) -> &mut LwVertex {
        let index = self.vertices.len().saturating_sub(1);
        &mut self.vertices[index]
    }

    pub(super) fn export_dxf(&self, writer: &mut dyn DxfStreamWriter) -> Result<()> {
        for vertex in &self.vertices {
            writer.write_point2d(VERTEX_CODE, vertex.location)?;
            if let Some(id) = vertex.id {
                writer.write_int(VERTEX_ID_CODE, id)?;
            }
            if let Some(width) = vertex.start_width {
                writer.write_double(START_WIDTH_CODE, width)?;
            }
            if let Some(width) = vertex.end_width {
                writer.write_double(END_WIDTH_CODE, width)?;
            }
            if vertex.bulge != 0.0 {
                writer.write_double(BULGE_CODE, vertex.bulge)?;
            }
        }
        Ok(())
    }
}

impl DxfEntity {
    /// New virtual LWPOLYLINE through `points`
    pub fn new_lwpolyline(points: &[Vector2], closed: bool) -> Self {
        let data = LwPolylineData {
            vertices: points.iter().copied().map(LwVertex::new).collect(),
        };
        let mut polyline = DxfEntity::new(EntityKind::LwPolyline(data));
        polyline
            .dxf
            .unprotected_set("flags", DxfValue::Int(if closed { CLOSED } else { 0 }));
        polyline
    }

    /// Vertices of a LWPOLYLINE, `None` for other types
    pub fn lwpolyline_vertices(&self) -> Option<&[LwVertex]> {
        match self.kind() {
            EntityKind::LwPolyline(data) => Some(&data.vertices),
            _ => None,
        }
    }
}
