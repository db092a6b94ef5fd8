//! Per-generation frame scheduler
//!
//! A [`RenderLoop`] is driven by whoever owns the display refresh (the winit
//! event loop, or a test). Each refresh calls [`RenderLoop::tick`], which
//! checks the cancellation token before touching anything, advances control
//! damping, draws, and re-arms itself for the next refresh.

use std::{cell::Cell, rc::Rc};

use log::{debug, warn};

use crate::{
    error::FrameError,
    gfx::{
        camera::{OrbitCamera, OrbitControls},
        surface::RenderSurface,
    },
};

/// Shared stop flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Caller's side of a running loop; stopping it is immediate.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    generation: u64,
    token: CancellationToken,
}

impl LoopHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("stopping render loop for generation {}", self.generation);
        }
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Everything one frame reads or advances
pub struct FrameContext<'a, S: RenderSurface> {
    pub camera: &'a mut OrbitCamera,
    pub controls: Option<&'a mut OrbitControls>,
    pub surface: &'a mut S,
}

#[derive(Debug)]
pub enum FrameOutcome {
    Drawn,
    /// The loop was stopped; nothing was touched
    Cancelled,
    /// Drawing failed; the loop keeps running
    Failed(FrameError),
}

pub struct RenderLoop {
    generation: u64,
    token: CancellationToken,
    scheduled: bool,
    frames_drawn: u64,
    frames_failed: u64,
}

impl RenderLoop {
    /// Starts a loop for `generation`, scheduled for the next refresh
    pub fn start(generation: u64) -> (RenderLoop, LoopHandle) {
        let token = CancellationToken::default();
        let handle = LoopHandle {
            generation,
            token: token.clone(),
        };
        let render_loop = RenderLoop {
            generation,
            token,
            scheduled: true,
            frames_drawn: 0,
            frames_failed: 0,
        };
        debug!("render loop started for generation {}", generation);
        (render_loop, handle)
    }

    pub fn stop(handle: &LoopHandle) {
        handle.stop();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when the next refresh should produce a frame
    pub fn is_scheduled(&self) -> bool {
        self.scheduled && !self.token.is_cancelled()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn frames_failed(&self) -> u64 {
        self.frames_failed
    }

    /// Runs one frame.
    pub fn tick<S: RenderSurface>(&mut self, frame: FrameContext<'_, S>) -> FrameOutcome {
        if self.token.is_cancelled() {
            self.scheduled = false;
            return FrameOutcome::Cancelled;
        }

        let FrameContext {
            camera,
            controls,
            surface,
        } = frame;

        if let Some(controls) = controls {
            controls.update(camera);
        }
        camera.update_view_proj();

        let outcome = match surface.draw(&camera.uniform) {
            Ok(()) => {
                self.frames_drawn += 1;
                FrameOutcome::Drawn
            }
            Err(err) => {
                self.frames_failed += 1;
                warn!(
                    "generation {} frame on surface {:?} failed: {}",
                    self.generation,
                    surface.id(),
                    err
                );
                FrameOutcome::Failed(err)
            }
        };

        self.scheduled = !self.token.is_cancelled();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CameraConfig, ControlsConfig},
        gfx::{
            camera::PointerInput,
            surface::{Container, HeadlessContainer},
        },
    };

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 1.0)
    }

    #[test]
    fn test_tick_draws_and_reschedules() {
        let mut container = HeadlessContainer::new(64, 64);
        let ledger = container.ledger();
        let mut surface = container.attach_surface().unwrap();
        let mut camera = camera();

        let (mut render_loop, handle) = RenderLoop::start(1);
        assert_eq!(handle.generation(), 1);
        assert!(render_loop.is_scheduled());

        for _ in 0..3 {
            let outcome = render_loop.tick(FrameContext {
                camera: &mut camera,
                controls: None,
                surface: &mut surface,
            });
            assert!(matches!(outcome, FrameOutcome::Drawn));
            assert!(render_loop.is_scheduled());
        }
        assert_eq!(render_loop.frames_drawn(), 3);
        assert_eq!(ledger.draws(), 3);
        assert_eq!(
            ledger.last_camera().map(|uniform| uniform.view_position),
            Some([0.0, 0.0, 3.0, 1.0])
        );
    }

    #[test]
    fn test_stop_before_tick_does_no_work() {
        let mut container = HeadlessContainer::new(64, 64);
        let ledger = container.ledger();
        let mut surface = container.attach_surface().unwrap();
        let mut camera = camera();

        let (mut render_loop, handle) = RenderLoop::start(7);
        RenderLoop::stop(&handle);
        assert!(handle.is_stopped());
        assert!(!render_loop.is_scheduled());

        let outcome = render_loop.tick(FrameContext {
            camera: &mut camera,
            controls: None,
            surface: &mut surface,
        });
        assert!(matches!(outcome, FrameOutcome::Cancelled));
        assert_eq!(ledger.draws(), 0);
        assert_eq!(render_loop.frames_drawn(), 0);
    }

    #[test]
    fn test_frame_errors_are_absorbed() {
        let mut container = HeadlessContainer::new(64, 64);
        let ledger = container.ledger();
        let mut surface = container.attach_surface().unwrap();
        let mut camera = camera();
        let (mut render_loop, _handle) = RenderLoop::start(1);

        ledger.fail_next_frames(2);
        for _ in 0..3 {
            render_loop.tick(FrameContext {
                camera: &mut camera,
                controls: None,
                surface: &mut surface,
            });
            assert!(render_loop.is_scheduled());
        }
        assert_eq!(render_loop.frames_failed(), 2);
        assert_eq!(render_loop.frames_drawn(), 1);
    }

    #[test]
    fn test_tick_advances_control_damping() {
        let mut container = HeadlessContainer::new(64, 64);
        let mut surface = container.attach_surface().unwrap();
        let mut camera = camera();
        let mut controls = OrbitControls::new(surface.id(), &ControlsConfig::default());
        controls.handle_input(PointerInput::Scrolled(1.0));

        let (mut render_loop, _handle) = RenderLoop::start(1);
        render_loop.tick(FrameContext {
            camera: &mut camera,
            controls: Some(&mut controls),
            surface: &mut surface,
        });
        assert!(camera.distance < 3.0);
        assert!(!controls.is_idle());
    }
}
