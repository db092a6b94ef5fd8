pub mod camera_utils;
pub mod orbit_camera;
pub mod orbit_controls;

// Re-export main types
pub use camera_utils::CameraUniform;
pub use orbit_camera::OrbitCamera;
pub use orbit_controls::{OrbitControls, PointerButton, PointerInput};
