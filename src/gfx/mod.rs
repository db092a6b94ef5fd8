//! # Graphics Module
//!
//! Everything between a [`PoseData`](crate::pose::PoseData) and pixels.
//!
//! - **Geometry** ([`geometry`]) - unit meshes, grid lines and vector math
//! - **Skeleton** ([`skeleton`]) - joints and bones derived from a pose
//! - **Scene** ([`scene`]) - lights, grid and materials around a skeleton
//! - **Camera** ([`camera`]) - orbit camera with damped pointer controls
//! - **Rendering** ([`rendering`]) - the `wgpu` surface and the frame loop
//! - **Resources** ([`resources`]) - uniform bindings and depth buffers
//! - **Surfaces** ([`surface`]) - containers that host a drawing surface

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod skeleton;
pub mod surface;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
