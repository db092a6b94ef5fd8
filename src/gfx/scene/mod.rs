//! # Scene Management Module
//!
//! Builds the renderable description of a pose: joint and bone primitives,
//! the lighting rig and the ground grid.
//!
//! ## Key Components
//!
//! - [`SceneManager`] - Stateless builder that turns a pose into a scene
//! - [`SceneHandle`] - One immutable scene, owned by a single generation
//! - [`Vertex3D`] / [`InstanceRaw`] / [`LineVertex`] - GPU buffer layouts
//!
//! ## Usage
//!
//! ```rust
//! use skeleton3d::config::ViewerConfig;
//! use skeleton3d::gfx::scene::SceneManager;
//! use skeleton3d::pose::{Landmark, PoseData};
//!
//! let manager = SceneManager::new(&ViewerConfig::default());
//! let pose = PoseData::new(vec![Landmark::new(0.0, 0.0, 0.0, 1.0)], vec![]);
//! let scene = manager.rebuild(&pose);
//! assert_eq!(scene.joints().len(), 1);
//! ```

pub mod scene;
pub mod vertex;

// Re-export main types
pub use scene::{
    AmbientLight, DirectionalLight, Grid, LightRig, Material, SceneHandle, SceneManager,
};
pub use vertex::{InstanceRaw, LineVertex, Vertex3D};
