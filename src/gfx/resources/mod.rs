//! GPU resource management
//!
//! Uniform bindings and depth buffers shared by the render pipelines.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUniform};
pub use texture_resource::TextureResource;
