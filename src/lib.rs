//! Skeleton3D
//!
//! Interactive 3D viewer for body-pose landmarks, built on wgpu and winit.
//! Each pose becomes spheres at visible landmarks and cylinders along the
//! connections between them, drawn over a ground grid with an orbit camera.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod lifecycle;
pub mod pose;
pub mod prelude;
pub mod viewport;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use lifecycle::Skeleton3D;
pub use pose::PoseData;
