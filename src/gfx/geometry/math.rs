//! Vector and orientation helpers used to place skeleton primitives.
//!
//! Everything here is a pure function over `cgmath` types. Zero-length input
//! never panics: `normalize` yields the zero vector and `orientation_to` yields
//! the identity rotation flagged as degenerate.

use cgmath::{InnerSpace, One, Quaternion, Rotation, Vector3, Zero};

/// Axis that bone and cylinder meshes are modeled along.
pub fn reference_axis() -> Vector3<f32> {
    Vector3::unit_y()
}

pub fn subtract(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    a - b
}

pub fn length(v: Vector3<f32>) -> f32 {
    v.magnitude()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
pub fn normalize(v: Vector3<f32>) -> Vector3<f32> {
    let len = length(v);
    if len == 0.0 {
        Vector3::zero()
    } else {
        v / len
    }
}

pub fn is_finite(v: Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Rotation taking the reference axis onto a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub rotation: Quaternion<f32>,
    /// Set when the direction had zero length and the identity was used
    pub degenerate: bool,
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            rotation: Quaternion::one(),
            degenerate: true,
        }
    }

    pub fn rotate(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.rotation.rotate_vector(v)
    }

    pub fn is_finite(&self) -> bool {
        let q = self.rotation;
        q.s.is_finite() && is_finite(q.v)
    }
}

/// Returns the rotation mapping `(0, 1, 0)` onto `normalize(direction)`.
///
/// An anti-parallel direction gets a half turn around the X axis.
/// A zero-length direction gets the identity, flagged `degenerate`.
pub fn orientation_to(direction: Vector3<f32>) -> Orientation {
    let to = normalize(direction);
    if to == Vector3::zero() {
        return Orientation::identity();
    }

    Orientation {
        rotation: Quaternion::from_arc(reference_axis(), to, Some(Vector3::unit_x())),
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!(
            (a - b).magnitude() < 1e-5,
            "expected {:?} to be close to {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_subtract_and_length() {
        let d = subtract(Vector3::new(4.0, 6.0, 3.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(d, Vector3::new(3.0, 4.0, 0.0));
        assert_eq!(length(d), 5.0);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(Vector3::zero()), Vector3::zero());
        assert_close(normalize(Vector3::new(0.0, 0.0, -7.0)), -Vector3::unit_z());
    }

    #[test]
    fn test_orientation_maps_reference_axis() {
        let directions = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 2.0, -3.0),
            Vector3::new(-0.2, -0.9, 0.1),
            Vector3::new(0.0, 5.0, 0.0),
            Vector3::new(1e-3, -1.0, 0.0),
            Vector3::new(0.0, -1.0, -2e-3),
        ];
        for direction in directions {
            let orientation = orientation_to(direction);
            assert!(!orientation.degenerate);
            let rotated = orientation.rotate(reference_axis());
            assert!(
                (rotated - normalize(direction)).magnitude() < 1e-4,
                "{:?} rotated to {:?}",
                direction,
                rotated
            );
        }
    }

    #[test]
    fn test_orientation_antiparallel() {
        let orientation = orientation_to(Vector3::new(0.0, -2.0, 0.0));
        assert!(!orientation.degenerate);
        assert!(orientation.is_finite());
        assert_close(orientation.rotate(reference_axis()), -Vector3::unit_y());
    }

    #[test]
    fn test_orientation_zero_length_is_identity() {
        let orientation = orientation_to(Vector3::zero());
        assert!(orientation.degenerate);
        assert_eq!(orientation.rotation, Quaternion::one());
    }
}
