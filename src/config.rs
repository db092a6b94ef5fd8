//! Viewer configuration
//!
//! All tunables live in plain structs whose `Default` impls carry the stock
//! look of the viewer. Every struct deserializes with `#[serde(default)]`, so a
//! partial JSON document only overrides the values it names:
//!
//! ```
//! use skeleton3d::config::ViewerConfig;
//!
//! let config = ViewerConfig::from_json_str(r#"{ "skeleton": { "joint_radius": 0.03 } }"#).unwrap();
//! assert_eq!(config.skeleton.joint_radius, 0.03);
//! assert_eq!(config.skeleton.bone_radius, 0.01);
//! ```

use serde::Deserialize;

use crate::gfx::scene::{AmbientLight, DirectionalLight};

/// Converts a `0xRRGGBB` color into normalized RGB.
pub fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub skeleton: SkeletonConfig,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Joint/bone sizing and the visibility cut-off.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Landmarks must be strictly above this confidence to be drawn
    pub visibility_threshold: f32,
    pub joint_radius: f32,
    pub bone_radius: f32,
    pub joint_color: [f32; 3],
    pub joint_emissive: [f32; 3],
    pub bone_color: [f32; 3],
    pub sphere_segments: u32,
    pub cylinder_segments: u32,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            joint_radius: 0.02,
            bone_radius: 0.01,
            joint_color: hex_color(0xffffff),
            joint_emissive: hex_color(0x444444),
            bone_color: hex_color(0xeeeeee),
            sphere_segments: 16,
            cylinder_segments: 8,
        }
    }
}

/// Background, lighting rig and ground grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: [f32; 3],
    pub ambient: AmbientLight,
    pub key_light: DirectionalLight,
    /// Back light for silhouette definition, `null` disables it
    pub fill_light: Option<DirectionalLight>,
    pub grid: GridConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: hex_color(0x1a1a1a),
            ambient: AmbientLight {
                color: hex_color(0xffffff),
                intensity: 0.6,
            },
            key_light: DirectionalLight {
                position: [5.0, 5.0, 5.0],
                color: hex_color(0xffffff),
                intensity: 0.8,
            },
            fill_light: Some(DirectionalLight {
                position: [-5.0, 3.0, -5.0],
                color: hex_color(0xffffff),
                intensity: 0.3,
            }),
            grid: GridConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: f32,
    pub divisions: u32,
    pub center_color: [f32; 3],
    pub line_color: [f32; 3],
    /// Gap between the lowest joint and the grid plane
    pub clearance: f32,
    /// Grid height used when the scene has no joints
    pub fallback_height: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 2.0,
            divisions: 10,
            center_color: hex_color(0x444444),
            line_color: hex_color(0x222222),
            clearance: 0.05,
            fallback_height: -1.0,
        }
    }
}

/// Projection and initial orbit placement.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            distance: 3.0,
            pitch: 0.0,
            yaw: 0.0,
            target: [0.0, 0.0, 0.0],
            min_distance: 0.2,
            max_distance: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    /// Fraction of pending motion applied each frame
    pub damping_factor: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(hex_color(0x000000), [0.0, 0.0, 0.0]);
        let c = hex_color(0x1a1a1a);
        assert!((c[0] - 26.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{ "camera": { "fov_degrees": 60.0 }, "scene": { "fill_light": null } }"#,
        )
        .unwrap();

        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.znear, 0.1);
        assert!(config.scene.fill_light.is_none());
        assert_eq!(config.scene.key_light.intensity, 0.8);
        assert_eq!(config.skeleton.visibility_threshold, 0.5);
    }

    #[test]
    fn test_default_sizes_are_small_and_nonzero() {
        let skeleton = SkeletonConfig::default();
        assert!(skeleton.joint_radius > 0.0 && skeleton.joint_radius < 0.1);
        assert!(skeleton.bone_radius > 0.0 && skeleton.bone_radius < skeleton.joint_radius);
    }
}
