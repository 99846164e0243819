//! DXF stream writer trait and tag level helpers

use crate::error::Result;
use crate::io::dxf::group_code::{is_chunked_binary_code, BINARY_CHUNK_SIZE};
use crate::io::dxf::tags::{DxfValue, Tag, Tags};
use crate::types::{Handle, Vector2, Vector3};

/// Trait for writing DXF code/value pairs
pub trait DxfStreamWriter {
    /// Write a code/value pair with a string value
    fn write_string(&mut self, code: i32, value: &str) -> Result<()>;

    /// Write a code/value pair with an integer value
    fn write_int(&mut self, code: i32, value: i64) -> Result<()>;

    /// Write a code/value pair with a double value
    fn write_double(&mut self, code: i32, value: f64) -> Result<()>;

    /// Write a code/value pair with a handle value
    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()>;

    /// Write one binary chunk
    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()>;

    /// Write a 2D point (codes 10/20 or similar)
    fn write_point2d(&mut self, x_code: i32, point: Vector2) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)
    }

    /// Write a 3D point (codes 10/20/30 or similar)
    fn write_point3d(&mut self, x_code: i32, point: Vector3) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)?;
        self.write_double(x_code + 20, point.z)
    }

    /// Flush the writer
    fn flush(&mut self) -> Result<()>;
}

/// Extension trait for convenient writing operations
pub trait DxfStreamWriterExt: DxfStreamWriter {
    /// Write a typed tag, chunked binary data is split into several tags
    fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        let code = tag.code;
        match &tag.value {
            DxfValue::Int(v) => self.write_int(code, *v),
            DxfValue::Float(v) => self.write_double(code, *v),
            DxfValue::Text(s) => self.write_string(code, s),
            DxfValue::Point2(p) => self.write_point2d(code, *p),
            DxfValue::Point3(p) => self.write_point3d(code, *p),
            DxfValue::Handle(h) => self.write_handle(code, *h),
            DxfValue::Binary(data) if is_chunked_binary_code(code) && !data.is_empty() => {
                for chunk in data.chunks(BINARY_CHUNK_SIZE) {
                    self.write_binary(code, chunk)?;
                }
                Ok(())
            }
            DxfValue::Binary(data) => self.write_binary(code, data),
        }
    }

    /// Write all tags in order
    fn write_tags(&mut self, tags: &Tags) -> Result<()> {
        for tag in tags {
            self.write_tag(tag)?;
        }
        Ok(())
    }

    /// Write a subclass marker
    fn write_subclass(&mut self, marker: &str) -> Result<()> {
        self.write_string(100, marker)
    }

    /// Write section start
    fn write_section_start(&mut self, section_name: &str) -> Result<()> {
        self.write_string(0, "SECTION")?;
        self.write_string(2, section_name)
    }

    /// Write section end
    fn write_section_end(&mut self) -> Result<()> {
        self.write_string(0, "ENDSEC")
    }

    /// Write end of file
    fn write_eof(&mut self) -> Result<()> {
        self.write_string(0, "EOF")
    }
}

// Auto-implement the extension trait for all stream writers, trait objects included
impl<T: DxfStreamWriter + ?Sized> DxfStreamWriterExt for T {}
