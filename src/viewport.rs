//! Container size, camera and interactive controls.
//!
//! The camera lives here for the lifetime of the viewer; controls are bound to
//! one generation's surface at a time.

use log::{debug, info};

use crate::{
    config::{CameraConfig, ControlsConfig},
    gfx::{
        camera::{OrbitCamera, OrbitControls, PointerInput},
        surface::{RenderSurface, SurfaceId},
    },
};

pub struct ViewportController {
    width: u32,
    height: u32,
    camera: OrbitCamera,
    controls: Option<OrbitControls>,
    controls_config: ControlsConfig,
    detached: bool,
}

impl ViewportController {
    pub fn new(
        (width, height): (u32, u32),
        camera: &CameraConfig,
        controls: &ControlsConfig,
    ) -> Self {
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        Self {
            width,
            height,
            camera: OrbitCamera::from_config(camera, aspect),
            controls: None,
            controls_config: controls.clone(),
            detached: false,
        }
    }

    pub fn current_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Non-zero size and still listening for resizes
    pub fn is_ready(&self) -> bool {
        !self.detached && self.width > 0 && self.height > 0
    }

    /// Records a new container size and applies it to the camera and surface.
    ///
    /// Returns `true` when the size is usable. A zero width or height is stored
    /// but leaves the camera aspect and the surface alone.
    pub fn resize<S: RenderSurface>(
        &mut self,
        width: u32,
        height: u32,
        surface: Option<&mut S>,
    ) -> bool {
        if self.detached {
            debug!("resize to {}x{} after detach ignored", width, height);
            return false;
        }

        self.width = width;
        self.height = height;
        if width == 0 || height == 0 {
            debug!("container collapsed to {}x{}, waiting for layout", width, height);
            return false;
        }

        self.camera.resize_projection(width, height);
        if let Some(surface) = surface {
            surface.resize(width, height);
        }
        true
    }

    pub fn bind_controls(&mut self, surface: SurfaceId) {
        let controls = OrbitControls::new(surface, &self.controls_config);
        if let Some(previous) = self.controls.replace(controls) {
            debug!("controls moved from surface {:?}", previous.surface());
        }
        info!("controls bound to surface {:?}", surface);
    }

    pub fn unbind_controls(&mut self) {
        if let Some(controls) = self.controls.take() {
            debug!("controls unbound from surface {:?}", controls.surface());
        }
    }

    /// Surface the controls currently listen to
    pub fn controls_bound(&self) -> Option<SurfaceId> {
        self.controls.as_ref().map(OrbitControls::surface)
    }

    /// Forwards input to the bound controls. Returns `true` if the view will change.
    pub fn handle_input(&mut self, input: PointerInput) -> bool {
        match &mut self.controls {
            Some(controls) => controls.handle_input(input),
            None => false,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Camera and controls, borrowed together for one frame
    pub fn frame_parts(&mut self) -> (&mut OrbitCamera, Option<&mut OrbitControls>) {
        (&mut self.camera, self.controls.as_mut())
    }

    /// Stops following the container. Idempotent.
    pub fn detach(&mut self) {
        self.unbind_controls();
        if !self.detached {
            debug!("viewport detached from container");
        }
        self.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::surface::{Container, HeadlessContainer, HeadlessSurface, SurfaceEvent};

    fn viewport(size: (u32, u32)) -> ViewportController {
        ViewportController::new(size, &CameraConfig::default(), &ControlsConfig::default())
    }

    #[test]
    fn test_resize_updates_aspect_and_surface() {
        let mut container = HeadlessContainer::new(800, 600);
        let ledger = container.ledger();
        let mut surface = container.attach_surface().unwrap();
        let mut viewport = viewport((800, 600));

        assert!(viewport.resize(400, 300, Some(&mut surface)));
        assert_eq!(viewport.current_size(), (400, 300));
        assert!((viewport.camera().aspect - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(surface.size(), (400, 300));
        assert!(ledger
            .events()
            .contains(&SurfaceEvent::Resized(surface.id(), 400, 300)));
    }

    #[test]
    fn test_zero_size_keeps_aspect() {
        let mut viewport = viewport((1600, 900));
        let aspect = viewport.camera().aspect;

        assert!(!viewport.resize::<HeadlessSurface>(0, 900, None));
        assert!(!viewport.is_ready());
        assert_eq!(viewport.camera().aspect, aspect);

        assert!(viewport.resize::<HeadlessSurface>(900, 900, None));
        assert!(viewport.is_ready());
        assert!((viewport.camera().aspect - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_not_ready_until_laid_out() {
        let viewport = viewport((0, 0));
        assert!(!viewport.is_ready());
        assert_eq!(viewport.camera().aspect, 1.0);
    }

    #[test]
    fn test_input_requires_bound_controls() {
        let mut viewport = viewport((100, 100));
        assert!(!viewport.handle_input(PointerInput::Scrolled(1.0)));

        viewport.bind_controls(SurfaceId(4));
        assert_eq!(viewport.controls_bound(), Some(SurfaceId(4)));
        assert!(viewport.handle_input(PointerInput::Scrolled(1.0)));

        viewport.unbind_controls();
        assert_eq!(viewport.controls_bound(), None);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut viewport = viewport((100, 100));
        viewport.bind_controls(SurfaceId(1));
        viewport.detach();
        viewport.detach();
        assert!(viewport.is_detached());
        assert_eq!(viewport.controls_bound(), None);
        assert!(!viewport.resize::<HeadlessSurface>(50, 50, None));
        assert_eq!(viewport.current_size(), (100, 100));
    }
}
