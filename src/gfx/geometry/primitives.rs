//! # Primitive Shape Generation
//!
//! Unit meshes that the renderer instances for every joint and bone, plus the
//! line set of the ground grid. Per-primitive size and placement come from the
//! instance transform, so the meshes themselves are unit sized.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a UV sphere of radius 1.0 centered at the origin
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;

            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]); // Normal is same as position for unit sphere
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

/// Generate a capped cylinder of radius 1.0 and height 1.0 along the Y axis
///
/// The cylinder spans y = -0.5 to y = 0.5, so scaling Y by a bone length and
/// translating to the bone midpoint makes it reach both endpoints.
pub fn generate_cylinder(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = 0.5;

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let x = angle.cos();
        let z = angle.sin();

        data.vertices.push([x, -half_height, z]);
        data.normals.push([x, 0.0, z]);

        data.vertices.push([x, half_height, z]);
        data.normals.push([x, 0.0, z]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, top_current, bottom_next]);
        data.indices
            .extend_from_slice(&[top_current, top_next, bottom_next]);
    }

    // Caps get their own vertices so their normals point along the axis
    for (y, normal_y) in [(-half_height, -1.0), (half_height, 1.0)] {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, y, 0.0]);
        data.normals.push([0.0, normal_y, 0.0]);

        let ring_start = data.vertices.len() as u32;
        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            data.vertices.push([angle.cos(), y, angle.sin()]);
            data.normals.push([0.0, normal_y, 0.0]);
        }

        for i in 0..segs {
            let current = ring_start + i;
            let next = current + 1;
            if normal_y > 0.0 {
                data.indices.extend_from_slice(&[center, next, current]);
            } else {
                data.indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    data
}

/// One segment of the ground grid in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: [f32; 3],
    pub end: [f32; 3],
    /// The two lines crossing the origin
    pub center: bool,
}

/// Generate a square grid of `size` with `divisions` cells per side at y = 0
pub fn generate_grid_lines(size: f32, divisions: u32) -> Vec<GridLine> {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let center_index = divisions / 2;

    let mut lines = Vec::with_capacity(2 * (divisions as usize + 1));
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let center = divisions % 2 == 0 && i == center_index;

        lines.push(GridLine {
            start: [-half, 0.0, k],
            end: [half, 0.0, k],
            center,
        });
        lines.push(GridLine {
            start: [k, 0.0, -half],
            end: [k, 0.0, half],
            center,
        });
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cylinder_spans_unit_height_along_y() {
        let cylinder = generate_cylinder(8);
        let min_y = cylinder.vertices.iter().map(|v| v[1]).fold(f32::MAX, f32::min);
        let max_y = cylinder.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert_eq!(min_y, -0.5);
        assert_eq!(max_y, 0.5);
        assert!(cylinder.indices.iter().all(|&i| (i as usize) < cylinder.vertex_count()));
        // 8 side quads plus two 8-triangle caps
        assert_eq!(cylinder.triangle_count(), 8 * 2 + 8 * 2);
    }

    #[test]
    fn test_grid_lines() {
        let lines = generate_grid_lines(2.0, 10);
        assert_eq!(lines.len(), 22);
        assert_eq!(lines.iter().filter(|l| l.center).count(), 2);
        assert!(lines.iter().all(|l| l.start[1] == 0.0 && l.end[1] == 0.0));
        assert_eq!(lines[0].start, [-1.0, 0.0, -1.0]);
    }
}
