//! Core value types shared by the tag layer and the entity layer

mod handle;
mod vector;
mod version;

pub use handle::Handle;
pub use vector::{Vector2, Vector3};
pub use version::DxfVersion;
