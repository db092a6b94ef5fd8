//! Skeleton construction
//!
//! Turns a [`PoseData`] into joint spheres and bone cylinders positioned in
//! render space. The estimation model's y and z axes point the other way from
//! the renderer's, so every landmark maps to `(x, -y, -z)`.
//!
//! Landmarks at or below the visibility threshold produce nothing, and any
//! connection touching one is skipped. Skips are counted in [`BuildReport`]
//! rather than raised, so a partially occluded person still renders.

use cgmath::{Matrix4, Vector3};
use log::debug;

use crate::{
    config::SkeletonConfig,
    gfx::geometry::{is_finite, length, orientation_to, subtract, Orientation},
    pose::{Landmark, PoseData},
};

/// Maps a landmark into render space.
pub fn to_render_space(landmark: &Landmark) -> Vector3<f32> {
    Vector3::new(landmark.x, -landmark.y, -landmark.z)
}

/// Sphere drawn at a visible landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    /// Index into the pose's landmark sequence
    pub landmark: usize,
    pub position: Vector3<f32>,
    pub radius: f32,
}

impl Joint {
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from_scale(self.radius)
    }
}

/// Cylinder spanning two visible landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    pub start: usize,
    pub end: usize,
    /// Midpoint between the two endpoints
    pub position: Vector3<f32>,
    pub length: f32,
    pub orientation: Orientation,
    pub radius: f32,
}

impl Bone {
    /// Unit cylinder along +Y scaled to this bone and moved into place.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.orientation.rotation)
            * Matrix4::from_nonuniform_scale(self.radius, self.length, self.radius)
    }

    pub fn is_degenerate(&self) -> bool {
        self.orientation.degenerate
    }
}

/// What the builder left out and why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Joints and bones omitted because a landmark was not visible enough
    pub skipped_low_visibility: usize,
    /// Connections referencing a landmark index that does not exist
    pub skipped_out_of_range: usize,
    /// Primitives whose math produced NaN or infinity
    pub dropped_non_finite: usize,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        *self == Self::default()
    }
}

/// Joints and bones for one pose.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub joints: Vec<Joint>,
    pub bones: Vec<Bone>,
    pub report: BuildReport,
}

pub struct SkeletonBuilder {
    visibility_threshold: f32,
    joint_radius: f32,
    bone_radius: f32,
}

impl SkeletonBuilder {
    pub fn new(config: &SkeletonConfig) -> Self {
        Self {
            visibility_threshold: config.visibility_threshold,
            joint_radius: config.joint_radius,
            bone_radius: config.bone_radius,
        }
    }

    fn is_visible(&self, landmark: &Landmark) -> bool {
        landmark.visibility > self.visibility_threshold
    }

    pub fn build(&self, pose: &PoseData) -> Skeleton {
        let mut report = BuildReport::default();

        let mut joints = Vec::with_capacity(pose.landmarks.len());
        for (index, landmark) in pose.landmarks.iter().enumerate() {
            if !self.is_visible(landmark) {
                report.skipped_low_visibility += 1;
                continue;
            }

            let position = to_render_space(landmark);
            if !is_finite(position) {
                debug!("dropping joint {} with non-finite position", index);
                report.dropped_non_finite += 1;
                continue;
            }

            joints.push(Joint {
                landmark: index,
                position,
                radius: self.joint_radius,
            });
        }

        let mut bones = Vec::with_capacity(pose.connections.len());
        for connection in &pose.connections {
            let Some((start, end)) = pose.endpoints(connection) else {
                debug!(
                    "skipping connection {}-{}: index out of range ({} landmarks)",
                    connection.start,
                    connection.end,
                    pose.landmarks.len()
                );
                report.skipped_out_of_range += 1;
                continue;
            };

            if !self.is_visible(start) || !self.is_visible(end) {
                report.skipped_low_visibility += 1;
                continue;
            }

            let start_point = to_render_space(start);
            let end_point = to_render_space(end);
            let direction = subtract(end_point, start_point);
            let bone = Bone {
                start: connection.start,
                end: connection.end,
                position: start_point + direction * 0.5,
                length: length(direction),
                orientation: orientation_to(direction),
                radius: self.bone_radius,
            };

            if !is_finite(bone.position) || !bone.length.is_finite() || !bone.orientation.is_finite()
            {
                debug!(
                    "dropping bone {}-{} with non-finite geometry",
                    connection.start, connection.end
                );
                report.dropped_non_finite += 1;
                continue;
            }

            bones.push(bone);
        }

        if !report.is_complete() {
            debug!(
                "built partial skeleton: {} joints, {} bones, {:?}",
                joints.len(),
                bones.len(),
                report
            );
        }

        Skeleton {
            joints,
            bones,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{normalize, reference_axis};
    use crate::pose::Connection;
    use cgmath::InnerSpace;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn builder() -> SkeletonBuilder {
        SkeletonBuilder::new(&SkeletonConfig::default())
    }

    fn random_pose(rng: &mut StdRng) -> PoseData {
        let count = rng.random_range(1..40);
        let landmarks = (0..count)
            .map(|_| {
                Landmark::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(0.0..1.0),
                )
            })
            .collect();
        let connections = (0..rng.random_range(0..60))
            .map(|_| Connection::new(rng.random_range(0..count), rng.random_range(0..count)))
            .collect();
        PoseData::new(landmarks, connections)
    }

    #[test]
    fn test_example_pose() {
        let pose = PoseData::new(
            vec![
                Landmark::new(0.0, 0.0, 0.0, 1.0),
                Landmark::new(1.0, 0.0, 0.0, 1.0),
                Landmark::new(2.0, 0.0, 0.0, 0.3),
            ],
            vec![Connection::new(0, 1), Connection::new(1, 2)],
        );

        let skeleton = builder().build(&pose);

        assert_eq!(skeleton.joints.len(), 2);
        assert_eq!(skeleton.joints[0].landmark, 0);
        assert_eq!(skeleton.joints[1].landmark, 1);
        assert_eq!(skeleton.bones.len(), 1);

        let bone = skeleton.bones[0];
        assert_eq!((bone.start, bone.end), (0, 1));
        assert!((bone.length - 1.0).abs() < 1e-6);
        assert!((bone.position - Vector3::new(0.5, 0.0, 0.0)).magnitude() < 1e-6);
        assert_eq!(skeleton.report.skipped_low_visibility, 2);
    }

    #[test]
    fn test_joint_positions_invert_y_and_z() {
        let pose = PoseData::new(vec![Landmark::new(0.25, 0.5, -0.75, 0.9)], vec![]);
        let skeleton = builder().build(&pose);
        assert_eq!(skeleton.joints[0].position, Vector3::new(0.25, -0.5, 0.75));
        assert_eq!(skeleton.joints[0].radius, 0.02);
    }

    #[test]
    fn test_threshold_is_strict() {
        let pose = PoseData::new(
            vec![
                Landmark::new(0.0, 0.0, 0.0, 0.5),
                Landmark::new(0.0, 1.0, 0.0, 0.500_001),
            ],
            vec![Connection::new(0, 1)],
        );
        let skeleton = builder().build(&pose);
        assert_eq!(skeleton.joints.len(), 1);
        assert_eq!(skeleton.joints[0].landmark, 1);
        assert!(skeleton.bones.is_empty());
    }

    #[test]
    fn test_zero_length_bone_is_kept() {
        let pose = PoseData::new(
            vec![
                Landmark::new(0.3, 0.3, 0.3, 1.0),
                Landmark::new(0.3, 0.3, 0.3, 1.0),
            ],
            vec![Connection::new(0, 1)],
        );
        let skeleton = builder().build(&pose);
        assert_eq!(skeleton.bones.len(), 1);
        assert_eq!(skeleton.bones[0].length, 0.0);
        assert!(skeleton.bones[0].is_degenerate());
    }

    #[test]
    fn test_out_of_range_connection_is_skipped() {
        let pose = PoseData::new(
            vec![
                Landmark::new(0.0, 0.0, 0.0, 1.0),
                Landmark::new(0.0, 1.0, 0.0, 1.0),
            ],
            vec![Connection::new(0, 1), Connection::new(1, 5), Connection::new(9, 0)],
        );
        let skeleton = builder().build(&pose);
        assert_eq!(skeleton.bones.len(), 1);
        assert_eq!(skeleton.report.skipped_out_of_range, 2);
    }

    #[test]
    fn test_non_finite_landmarks_are_dropped() {
        let pose = PoseData::new(
            vec![
                Landmark::new(f32::NAN, 0.0, 0.0, 1.0),
                Landmark::new(0.0, 1.0, 0.0, 1.0),
                Landmark::new(0.0, f32::INFINITY, 0.0, 1.0),
            ],
            vec![Connection::new(0, 1), Connection::new(1, 2)],
        );
        let skeleton = builder().build(&pose);
        assert_eq!(skeleton.joints.len(), 1);
        assert!(skeleton.bones.is_empty());
        assert_eq!(skeleton.report.dropped_non_finite, 4);
    }

    #[test]
    fn test_random_poses_joints_match_visibility() {
        let mut rng = StdRng::seed_from_u64(7);
        let builder = builder();

        for _ in 0..200 {
            let pose = random_pose(&mut rng);
            let skeleton = builder.build(&pose);

            let visible: Vec<usize> = pose
                .landmarks
                .iter()
                .enumerate()
                .filter(|(_, l)| l.visibility > 0.5)
                .map(|(i, _)| i)
                .collect();
            let joints: Vec<usize> = skeleton.joints.iter().map(|j| j.landmark).collect();
            assert_eq!(joints, visible);

            for joint in &skeleton.joints {
                assert_eq!(joint.position, to_render_space(&pose.landmarks[joint.landmark]));
            }
        }
    }

    #[test]
    fn test_random_poses_bones_span_endpoints() {
        let mut rng = StdRng::seed_from_u64(11);
        let builder = builder();

        for _ in 0..200 {
            let pose = random_pose(&mut rng);
            let skeleton = builder.build(&pose);

            let expected = pose
                .connections
                .iter()
                .filter(|c| {
                    pose.landmarks[c.start].visibility > 0.5
                        && pose.landmarks[c.end].visibility > 0.5
                })
                .count();
            assert_eq!(skeleton.bones.len(), expected);

            for bone in &skeleton.bones {
                let start = to_render_space(&pose.landmarks[bone.start]);
                let end = to_render_space(&pose.landmarks[bone.end]);
                let direction = end - start;

                assert!((bone.length - direction.magnitude()).abs() < 1e-5);
                if bone.length > 1e-4 {
                    let mapped = bone.orientation.rotate(reference_axis());
                    assert!((mapped - normalize(direction)).magnitude() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_bone_matrix_reaches_endpoints() {
        let pose = PoseData::new(
            vec![
                Landmark::new(0.1, 0.2, 0.3, 1.0),
                Landmark::new(-0.4, 0.6, 0.0, 1.0),
            ],
            vec![Connection::new(0, 1)],
        );
        let skeleton = builder().build(&pose);
        let matrix = skeleton.bones[0].model_matrix();

        let top = matrix * cgmath::Vector4::new(0.0, 0.5, 0.0, 1.0);
        let bottom = matrix * cgmath::Vector4::new(0.0, -0.5, 0.0, 1.0);
        let end = to_render_space(&pose.landmarks[1]);
        let start = to_render_space(&pose.landmarks[0]);

        assert!((top.truncate() - end).magnitude() < 1e-5);
        assert!((bottom.truncate() - start).magnitude() < 1e-5);
    }
}
