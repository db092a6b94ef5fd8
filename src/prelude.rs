//! # Skeleton3D Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use skeleton3d::prelude::*;
//!
//! let container = HeadlessContainer::new(640, 480);
//! let mut viewer = Skeleton3D::new(container, ViewerConfig::default());
//! let pose = PoseData::from_json(r#"{"landmarks": [], "connections": []}"#).unwrap();
//! assert!(matches!(viewer.update(pose), UpdateOutcome::Activated { .. }));
//! ```

// Application and lifecycle
pub use crate::app::ViewerApp;
pub use crate::lifecycle::{LifecycleState, Skeleton3D, UpdateOutcome};
pub use crate::viewport::ViewportController;

// Data and configuration
pub use crate::config::{
    CameraConfig, ControlsConfig, GridConfig, SceneConfig, SkeletonConfig, ViewerConfig,
};
pub use crate::error::{FrameError, PoseError, SurfaceError};
pub use crate::pose::{Connection, Landmark, PoseData};

// Scene building
pub use crate::gfx::scene::{SceneHandle, SceneManager};
pub use crate::gfx::skeleton::{Bone, BuildReport, Joint, SkeletonBuilder};

// Camera, surfaces and rendering
pub use crate::gfx::camera::{OrbitCamera, OrbitControls, PointerButton, PointerInput};
pub use crate::gfx::rendering::{FrameOutcome, LoopHandle, RenderLoop};
pub use crate::gfx::surface::{Container, HeadlessContainer, RenderSurface, WindowContainer};
