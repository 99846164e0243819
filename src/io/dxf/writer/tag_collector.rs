//! In-memory tag sink

use super::stream_writer::DxfStreamWriter;
use crate::error::Result;
use crate::io::dxf::group_code::is_chunked_binary_code;
use crate::io::dxf::tags::{DxfValue, Tag, Tags};
use crate::types::{Handle, Vector2, Vector3};

/// Collects exported tags the way the compiler would read them back:
/// points stay merged and consecutive binary chunks are joined.
#[derive(Debug, Default)]
pub struct TagCollector {
    tags: Tags,
}

impl TagCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected tags
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn into_tags(self) -> Tags {
        self.tags
    }

    fn push(&mut self, code: i32, value: DxfValue) {
        self.tags.push(Tag { code, value });
    }
}

impl DxfStreamWriter for TagCollector {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.push(code, DxfValue::Text(value.to_string()));
        Ok(())
    }

    fn write_int(&mut self, code: i32, value: i64) -> Result<()> {
        self.push(code, DxfValue::Int(value));
        Ok(())
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.push(code, DxfValue::Float(value));
        Ok(())
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.push(code, DxfValue::Handle(handle));
        Ok(())
    }

    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        if is_chunked_binary_code(code) {
            if let Some(Tag {
                code: last_code,
                value: DxfValue::Binary(bytes),
            }) = self.tags.last_mut()
            {
                if *last_code == code {
                    bytes.extend_from_slice(data);
                    return Ok(());
                }
            }
        }
        self.push(code, DxfValue::Binary(data.to_vec()));
        Ok(())
    }

    fn write_point2d(&mut self, x_code: i32, point: Vector2) -> Result<()> {
        self.push(x_code, DxfValue::Point2(point));
        Ok(())
    }

    fn write_point3d(&mut self, x_code: i32, point: Vector3) -> Result<()> {
        self.push(x_code, DxfValue::Point3(point));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::writer::DxfStreamWriterExt;

    #[test]
    fn test_collects_typed_tags() {
        let mut collector = TagCollector::new();
        collector.write_string(0, "LINE").unwrap();
        collector.write_point3d(10, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        collector.write_tag(&Tag::new(310, vec![7u8; 200])).unwrap();
        let tags = collector.into_tags();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[1], Tag::new(10, Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(tags[2], Tag::new(310, vec![7u8; 200]));
    }
}
