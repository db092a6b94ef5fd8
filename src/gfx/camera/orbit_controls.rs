//! Damped orbit/zoom/pan controls
//!
//! Pointer input accumulates pending motion; [`OrbitControls::update`] applies a
//! fraction of it to the camera each frame and keeps the rest, so the view
//! eases to rest instead of snapping. Input arrives as [`PointerInput`] so the
//! controls do not depend on a windowing backend.

use log::debug;

use super::orbit_camera::OrbitCamera;
use crate::{config::ControlsConfig, gfx::surface::SurfaceId};

/// Pending motion below this is dropped.
const REST_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Drag rotates around the target
    Primary,
    /// Drag pans the target
    Secondary,
    Middle,
}

/// Backend-neutral pointer event on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Pressed(PointerButton),
    Released(PointerButton),
    /// Pointer motion in physical pixels since the previous event
    Moved { dx: f32, dy: f32 },
    /// Scroll in lines, positive away from the user
    Scrolled(f32),
    /// Pointer left the surface; any drag ends
    Left,
}

/// Camera controls bound to one drawing surface.
pub struct OrbitControls {
    surface: SurfaceId,
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    enable_damping: bool,
    damping_factor: f32,

    is_rotating: bool,
    is_panning: bool,

    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pending_pan: (f32, f32),
}

impl OrbitControls {
    pub fn new(surface: SurfaceId, config: &ControlsConfig) -> Self {
        Self {
            surface,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor.clamp(f32::EPSILON, 1.0),
            is_rotating: false,
            is_panning: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: (0.0, 0.0),
        }
    }

    /// Surface whose input these controls listen to
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Records input. Returns `true` when it changes the camera's course.
    pub fn handle_input(&mut self, input: PointerInput) -> bool {
        match input {
            PointerInput::Pressed(PointerButton::Primary) => {
                self.is_rotating = true;
                false
            }
            PointerInput::Pressed(PointerButton::Secondary) => {
                self.is_panning = true;
                false
            }
            PointerInput::Released(PointerButton::Primary) => {
                self.is_rotating = false;
                false
            }
            PointerInput::Released(PointerButton::Secondary) => {
                self.is_panning = false;
                false
            }
            PointerInput::Pressed(_) | PointerInput::Released(_) => false,
            PointerInput::Left => {
                self.is_rotating = false;
                self.is_panning = false;
                false
            }
            PointerInput::Moved { dx, dy } => {
                if self.is_rotating {
                    self.pending_yaw -= dx * self.rotate_speed;
                    self.pending_pitch += dy * self.rotate_speed;
                    true
                } else if self.is_panning {
                    self.pending_pan.0 -= dx * self.pan_speed;
                    self.pending_pan.1 += dy * self.pan_speed;
                    true
                } else {
                    false
                }
            }
            PointerInput::Scrolled(lines) => {
                self.pending_zoom -= lines * self.zoom_speed;
                true
            }
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.is_rotating
    }

    pub fn is_panning(&self) -> bool {
        self.is_panning
    }

    /// True when no motion is left to apply
    pub fn is_idle(&self) -> bool {
        self.pending_yaw == 0.0
            && self.pending_pitch == 0.0
            && self.pending_zoom == 0.0
            && self.pending_pan == (0.0, 0.0)
    }

    /// Advances damping by one frame. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if self.is_idle() {
            return false;
        }

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let yaw = take_fraction(&mut self.pending_yaw, factor);
        let pitch = take_fraction(&mut self.pending_pitch, factor);
        let zoom = take_fraction(&mut self.pending_zoom, factor);
        let pan = (
            take_fraction(&mut self.pending_pan.0, factor),
            take_fraction(&mut self.pending_pan.1, factor),
        );

        if yaw != 0.0 {
            camera.add_yaw(yaw);
        }
        if pitch != 0.0 {
            camera.add_pitch(pitch);
        }
        if zoom != 0.0 {
            camera.zoom(zoom);
        }
        if pan != (0.0, 0.0) {
            camera.pan(pan);
        }

        if self.is_idle() {
            debug!("controls on surface {:?} came to rest", self.surface);
        }
        true
    }
}

/// Removes `factor` of `pending` and returns it; a remainder too small to see
/// is flushed in the same step.
fn take_fraction(pending: &mut f32, factor: f32) -> f32 {
    if *pending == 0.0 {
        return 0.0;
    }
    let mut step = *pending * factor;
    *pending -= step;
    if pending.abs() < REST_EPSILON {
        step += *pending;
        *pending = 0.0;
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn setup(enable_damping: bool) -> (OrbitControls, OrbitCamera) {
        let config = ControlsConfig {
            enable_damping,
            ..ControlsConfig::default()
        };
        let controls = OrbitControls::new(SurfaceId(1), &config);
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        (controls, camera)
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let (mut controls, mut camera) = setup(true);
        assert!(!controls.handle_input(PointerInput::Moved { dx: 10.0, dy: 5.0 }));
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_damped_rotation_eases_to_full_amount() {
        let (mut controls, mut camera) = setup(true);
        controls.handle_input(PointerInput::Pressed(PointerButton::Primary));
        controls.handle_input(PointerInput::Moved { dx: -100.0, dy: 0.0 });
        controls.handle_input(PointerInput::Released(PointerButton::Primary));

        assert!(controls.update(&mut camera));
        // One frame only applies the damping fraction
        assert!((camera.yaw - 0.5 * 0.05).abs() < 1e-6);

        let mut frames = 1;
        while controls.update(&mut camera) {
            frames += 1;
            assert!(frames < 1000, "controls never came to rest");
        }
        assert!(controls.is_idle());
        assert!((camera.yaw - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_undamped_rotation_applies_at_once() {
        let (mut controls, mut camera) = setup(false);
        controls.handle_input(PointerInput::Pressed(PointerButton::Primary));
        controls.handle_input(PointerInput::Moved { dx: 0.0, dy: 40.0 });

        assert!(controls.update(&mut camera));
        assert!((camera.pitch - 0.2).abs() < 1e-6);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_scroll_zooms_in() {
        let (mut controls, mut camera) = setup(false);
        assert!(controls.handle_input(PointerInput::Scrolled(1.0)));
        controls.update(&mut camera);
        assert!(camera.distance < 3.0);
    }

    #[test]
    fn test_secondary_drag_pans() {
        let (mut controls, mut camera) = setup(false);
        controls.handle_input(PointerInput::Pressed(PointerButton::Secondary));
        controls.handle_input(PointerInput::Moved { dx: -50.0, dy: 0.0 });
        controls.update(&mut camera);
        assert!(camera.target.x > 0.0);
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn test_leaving_surface_ends_drag() {
        let (mut controls, _) = setup(true);
        controls.handle_input(PointerInput::Pressed(PointerButton::Primary));
        assert!(controls.is_rotating());
        controls.handle_input(PointerInput::Left);
        assert!(!controls.is_rotating());
        assert_eq!(controls.surface(), SurfaceId(1));
    }
}
