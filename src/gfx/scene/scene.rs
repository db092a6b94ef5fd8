use log::debug;
use serde::Deserialize;

use crate::{
    config::{GridConfig, SceneConfig, SkeletonConfig, ViewerConfig},
    gfx::{
        geometry::{generate_grid_lines, GridLine},
        skeleton::{Bone, BuildReport, Joint, Skeleton, SkeletonBuilder},
    },
    pose::PoseData,
};

use super::vertex::{InstanceRaw, LineVertex};

/// Uniform light applied to every surface.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.6,
        }
    }
}

/// Light shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    /// Unit vector from the origin toward the light
    pub fn direction(&self) -> [f32; 3] {
        let [x, y, z] = self.position;
        let len = (x * x + y * y + z * z).sqrt();
        if len == 0.0 {
            [0.0, 1.0, 0.0]
        } else {
            [x / len, y / len, z / len]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: Option<DirectionalLight>,
}

/// Flat-colored surface description for one primitive kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
}

/// Ground reference grid placed under the model.
#[derive(Debug, Clone)]
pub struct Grid {
    pub lines: Vec<GridLine>,
    pub height: f32,
    pub center_color: [f32; 3],
    pub line_color: [f32; 3],
}

impl Grid {
    fn below(joints: &[Joint], config: &GridConfig) -> Self {
        let height = joints
            .iter()
            .map(|joint| joint.position.y - joint.radius)
            .reduce(f32::min)
            .map(|lowest| lowest - config.clearance)
            .unwrap_or(config.fallback_height);

        Self {
            lines: generate_grid_lines(config.size, config.divisions),
            height,
            center_color: config.center_color,
            line_color: config.line_color,
        }
    }

    /// Line-list vertices with the grid lifted to its height
    pub fn vertices(&self) -> Vec<LineVertex> {
        self.lines
            .iter()
            .flat_map(|line| {
                let color = if line.center {
                    self.center_color
                } else {
                    self.line_color
                };
                [line.start, line.end].map(|[x, _, z]| LineVertex {
                    position: [x, self.height, z],
                    color,
                })
            })
            .collect()
    }
}

/// Everything drawn for one pose.
///
/// A handle is never modified after [`SceneManager::rebuild`] returns it; a new
/// pose produces a new handle and the old one is dropped with its generation.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    pub background: [f32; 3],
    pub lights: LightRig,
    pub grid: Grid,
    pub joint_material: Material,
    pub bone_material: Material,
    skeleton: Skeleton,
}

impl SceneHandle {
    pub fn joints(&self) -> &[Joint] {
        &self.skeleton.joints
    }

    pub fn bones(&self) -> &[Bone] {
        &self.skeleton.bones
    }

    pub fn report(&self) -> &BuildReport {
        &self.skeleton.report
    }

    /// Number of joint and bone primitives
    pub fn primitive_count(&self) -> usize {
        self.skeleton.joints.len() + self.skeleton.bones.len()
    }

    pub fn joint_instances(&self) -> Vec<InstanceRaw> {
        self.joints()
            .iter()
            .map(|joint| {
                InstanceRaw::new(
                    joint.model_matrix(),
                    self.joint_material.color,
                    self.joint_material.emissive,
                )
            })
            .collect()
    }

    pub fn bone_instances(&self) -> Vec<InstanceRaw> {
        self.bones()
            .iter()
            .map(|bone| {
                InstanceRaw::new(
                    bone.model_matrix(),
                    self.bone_material.color,
                    self.bone_material.emissive,
                )
            })
            .collect()
    }
}

/// Builds scenes from poses.
///
/// Holds only configuration, so every rebuild starts from nothing.
pub struct SceneManager {
    builder: SkeletonBuilder,
    skeleton_config: SkeletonConfig,
    scene_config: SceneConfig,
}

impl SceneManager {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            builder: SkeletonBuilder::new(&config.skeleton),
            skeleton_config: config.skeleton.clone(),
            scene_config: config.scene.clone(),
        }
    }

    pub fn rebuild(&self, pose: &PoseData) -> SceneHandle {
        let skeleton = self.builder.build(pose);
        let grid = Grid::below(&skeleton.joints, &self.scene_config.grid);

        debug!(
            "scene rebuilt: {} joints, {} bones, grid at y={:.3}",
            skeleton.joints.len(),
            skeleton.bones.len(),
            grid.height
        );

        SceneHandle {
            background: self.scene_config.background,
            lights: LightRig {
                ambient: self.scene_config.ambient,
                key: self.scene_config.key_light,
                fill: self.scene_config.fill_light,
            },
            grid,
            joint_material: Material {
                color: self.skeleton_config.joint_color,
                emissive: self.skeleton_config.joint_emissive,
            },
            bone_material: Material {
                color: self.skeleton_config.bone_color,
                emissive: [0.0; 3],
            },
            skeleton,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Connection, Landmark};

    fn arm_pose() -> PoseData {
        PoseData::new(
            vec![
                Landmark::new(0.0, -0.5, 0.0, 0.9),
                Landmark::new(0.0, 0.0, 0.0, 0.9),
                Landmark::new(0.0, 0.8, 0.0, 0.9),
            ],
            vec![Connection::new(0, 1), Connection::new(1, 2)],
        )
    }

    #[test]
    fn test_rebuild_contains_lights_grid_and_primitives() {
        let manager = SceneManager::new(&ViewerConfig::default());
        let scene = manager.rebuild(&arm_pose());

        assert_eq!(scene.joints().len(), 3);
        assert_eq!(scene.bones().len(), 2);
        assert_eq!(scene.primitive_count(), 5);
        assert_eq!(scene.lights.ambient.intensity, 0.6);
        assert_eq!(scene.lights.key.position, [5.0, 5.0, 5.0]);
        assert!(scene.lights.fill.is_some());
        assert_eq!(scene.grid.lines.len(), 22);
    }

    #[test]
    fn test_grid_sits_below_lowest_joint() {
        let manager = SceneManager::new(&ViewerConfig::default());
        let scene = manager.rebuild(&arm_pose());

        // Landmark y = 0.8 becomes render y = -0.8
        let expected = -0.8 - 0.02 - 0.05;
        assert!((scene.grid.height - expected).abs() < 1e-6);
        assert!(scene
            .grid
            .vertices()
            .iter()
            .all(|v| v.position[1] == scene.grid.height));
    }

    #[test]
    fn test_empty_pose_uses_fallback_grid() {
        let manager = SceneManager::new(&ViewerConfig::default());
        let scene = manager.rebuild(&PoseData::default());
        assert_eq!(scene.primitive_count(), 0);
        assert_eq!(scene.grid.height, -1.0);
    }

    #[test]
    fn test_rebuild_has_no_carry_over() {
        let manager = SceneManager::new(&ViewerConfig::default());
        let first = manager.rebuild(&arm_pose());

        let single = PoseData::new(vec![Landmark::new(0.1, 0.1, 0.1, 1.0)], vec![]);
        let second = manager.rebuild(&single);
        let again = manager.rebuild(&arm_pose());

        assert_eq!(second.primitive_count(), 1);
        assert_eq!(first.joints(), again.joints());
        assert_eq!(first.bones(), again.bones());
    }

    #[test]
    fn test_instances_match_primitives() {
        let manager = SceneManager::new(&ViewerConfig::default());
        let scene = manager.rebuild(&arm_pose());

        let joints = scene.joint_instances();
        assert_eq!(joints.len(), 3);
        assert_eq!(joints[0].color, [1.0, 1.0, 1.0, 1.0]);
        // Translation lives in the last column
        assert_eq!(joints[0].model[3][1], 0.5);
        assert_eq!(scene.bone_instances().len(), 2);
    }

    #[test]
    fn test_fill_light_can_be_disabled() {
        let config = ViewerConfig::from_json_str(r#"{ "scene": { "fill_light": null } }"#).unwrap();
        let scene = SceneManager::new(&config).rebuild(&arm_pose());
        assert!(scene.lights.fill.is_none());
    }

    #[test]
    fn test_light_direction_is_normalized() {
        let light = DirectionalLight::default();
        let [x, y, z] = light.direction();
        assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-6);
    }
}
