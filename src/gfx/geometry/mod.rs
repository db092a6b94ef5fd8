//! # Geometry
//!
//! Vector math for placing skeleton primitives ([`math`]) and procedural unit
//! meshes for drawing them ([`primitives`]).
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use skeleton3d::gfx::geometry::{generate_sphere, orientation_to, reference_axis};
//!
//! let sphere = generate_sphere(16, 16);
//! assert!(sphere.triangle_count() > 0);
//!
//! let orientation = orientation_to(Vector3::new(1.0, 0.0, 0.0));
//! let mapped = orientation.rotate(reference_axis());
//! assert!((mapped.x - 1.0).abs() < 1e-5);
//! ```

pub mod math;
pub mod primitives;

pub use math::*;
pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions and normals into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}
