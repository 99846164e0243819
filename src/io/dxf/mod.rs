//! DXF (Drawing Exchange Format) tag streams: reading, compiling and writing

pub mod group_code;
pub mod reader;
pub mod writer;

mod tags;

pub use group_code::ValueKind;
pub use reader::{DxfReader, DxfReaderConfiguration, DxfTextReader, TagCompiler};
pub use tags::{group_tags, DxfValue, Tag, Tags};
pub use writer::{
    write_dxf, DxfStreamWriter, DxfStreamWriterExt, DxfTextWriter, DxfWriter,
    DxfWriterConfiguration, SectionWriter, TagCollector,
};
