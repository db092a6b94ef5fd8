use super::camera_utils::CameraUniform;
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting a target point, Y up.
///
/// The camera outlives scene rebuilds: a new pose replaces what is drawn, not
/// where it is looked at from.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad::from(Deg(75.0)),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(
            config.distance,
            config.pitch,
            config.yaw,
            Vector3::from(config.target),
            aspect,
        );
        camera.fovy = Rad::from(Deg(config.fov_degrees));
        camera.znear = config.znear;
        camera.zfar = config.zfar;
        camera.bounds.min_distance = Some(config.min_distance);
        camera.bounds.max_distance = Some(config.max_distance);
        camera
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Scales the distance by `exp(delta)`, so equal steps feel equal at any zoom
    pub fn zoom(&mut self, delta: f32) {
        self.set_distance(self.distance * delta.exp());
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    /// Yaw is unbounded; the camera can circle the target freely
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance;

        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;
        self.target += movement;
        self.update();
    }

    /// Updates the camera after changing `distance`, `pitch`, `yaw` or `target`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    /// Matches the projection to a new surface size.
    ///
    /// A zero-area size keeps the previous aspect ratio.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Refreshes `uniform` from the current placement and projection
    pub fn update_view_proj(&mut self) {
        self.uniform = CameraUniform::new(self.eye, self.view_projection());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 800.0 / 600.0)
    }

    #[test]
    fn test_default_placement_looks_down_negative_z() {
        let camera = camera();
        assert!((camera.eye - Vector3::new(0.0, 0.0, 3.0)).magnitude() < 1e-6);
        assert_eq!(camera.up, Vector3::unit_y());
        assert!((Deg::from(camera.fovy).0 - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_projection() {
        let mut camera = camera();
        camera.resize_projection(400, 300);
        assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);

        camera.resize_projection(0, 300);
        assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_respects_bounds() {
        let mut camera = camera();
        camera.zoom(100.0);
        assert_eq!(camera.distance, 50.0);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, 0.2);
    }

    #[test]
    fn test_pitch_is_clamped_short_of_poles() {
        let mut camera = camera();
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        camera.update_view_proj();
        assert!(camera.uniform.view_proj.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pan_moves_target_and_eye_together() {
        let mut camera = camera();
        let offset = camera.eye - camera.target;
        camera.pan((0.1, 0.0));
        assert!(camera.target.x > 0.0);
        assert!(((camera.eye - camera.target) - offset).magnitude() < 1e-5);
    }

    #[test]
    fn test_yaw_circles_without_limit() {
        let mut camera = camera();
        let distance = camera.distance;
        camera.add_yaw(std::f32::consts::PI);
        assert!((camera.eye - Vector3::new(0.0, 0.0, -3.0)).magnitude() < 1e-5);

        camera.add_yaw(4.0 * std::f32::consts::PI);
        assert!((camera.yaw - 5.0 * std::f32::consts::PI).abs() < 1e-5);
        assert!(((camera.eye - camera.target).magnitude() - distance).abs() < 1e-5);
    }
}
