//! I/O for DXF text streams

pub mod dxf;

pub use dxf::{DxfReader, DxfWriter};
