//! # dxf-records
//!
//! The record substrate of DXF: typed tags, schema-driven entities and a
//! handle-indexed entity database.
//!
//! A DXF file is a flat stream of (group code, value) pairs. This crate
//! turns that stream into typed [`Tag`]s, splits it into sections and
//! entities, and maps the tags of each entity onto the attributes its
//! schema declares. Everything the schemas do not know is kept, so a
//! read-modify-write cycle reproduces the input.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dxf_records::io::dxf::{DxfReader, DxfWriter};
//!
//! let mut doc = DxfReader::from_file("sample.dxf")?.read()?;
//!
//! for entity in doc.entities("ENTITIES") {
//!     println!("{} on layer {:?}", entity.entity_name(), entity.get("layer")?);
//! }
//!
//! let handle = doc.entitydb.handles().next().unwrap();
//! doc.entitydb.get_mut(handle)?.set("layer", "WALLS")?;
//! DxfWriter::new(&doc).write_to_file("output.dxf")?;
//! # Ok::<(), dxf_records::error::DxfError>(())
//! ```
//!
//! ## Layers
//!
//! - [`io::dxf`]: tokenizer, tag compiler, structure loader and writers
//! - [`entities`]: subclass partitioning, attribute schemas, namespaces
//!   and the supported entity kinds
//! - [`database`]: the handle-indexed entity store
//! - [`document`]: sections in file order over an entity database

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod database;
pub mod document;
pub mod entities;
pub mod error;
pub mod io;
pub mod notification;
pub mod objects;
pub mod tables;
pub mod types;
pub mod xdata;

// Re-export commonly used types
pub use database::{EntityDb, HandleGenerator, Trashcan};
pub use document::{DxfDocument, HeaderVars, SectionItem};
pub use entities::{DxfAttr, DxfAttributes, DxfEntity, DxfNamespace, EntityKind, EntityState, ExtendedTags};
pub use error::{DxfError, Result};
pub use io::dxf::{
    group_tags, DxfReader, DxfReaderConfiguration, DxfValue, DxfWriter, DxfWriterConfiguration, Tag,
    Tags,
};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use types::{DxfVersion, Handle, Vector2, Vector3};
pub use xdata::XData;
