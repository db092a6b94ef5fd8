//! # Viewer Lifecycle
//!
//! [`Skeleton3D`] owns one container and, at most, one *generation*: the scene,
//! drawing surface, control binding and render loop built for a single pose.
//!
//! ```text
//!            update             update
//!   Empty ───────────▶ Active ◀─────────▶ Rebuilding
//!     │                  │                    │
//!     └──────────────────┴─── dispose ────────┴──▶ Disposed
//! ```
//!
//! A new pose always tears the previous generation down completely (loop
//! stopped, controls unbound, surface handed back to the container) before the
//! next one is created, so a container never hosts two surfaces at once.
//!
//! ```
//! use skeleton3d::prelude::*;
//!
//! let container = HeadlessContainer::new(800, 600);
//! let ledger = container.ledger();
//! let mut viewer = Skeleton3D::new(container, ViewerConfig::default());
//!
//! let pose = PoseData::new(vec![Landmark::new(0.0, 0.0, 0.0, 1.0)], vec![]);
//! assert!(matches!(viewer.update(pose), UpdateOutcome::Activated { generation: 1 }));
//! viewer.frame();
//! viewer.dispose();
//! assert_eq!(ledger.attached_count(), 0);
//! ```

use log::{debug, info, warn};

use crate::{
    config::ViewerConfig,
    error::{PoseError, SurfaceError},
    gfx::{
        camera::PointerInput,
        rendering::{FrameContext, FrameOutcome, LoopHandle, RenderLoop},
        scene::{SceneHandle, SceneManager},
        surface::{Container, RenderSurface},
    },
    pose::PoseData,
    viewport::ViewportController,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No pose has been shown yet
    Empty,
    Active,
    /// Between tearing down one generation and starting the next
    Rebuilding,
    Disposed,
}

/// Result of handing the viewer a pose.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// First generation started
    Activated { generation: u64 },
    /// Previous generation replaced
    Rebuilt { generation: u64 },
    /// Container has no size yet; the pose is shown once it does
    Deferred,
    /// Pose was unusable; the current generation is untouched
    Rejected(PoseError),
    /// No drawing surface could be attached
    Failed(SurfaceError),
    /// Viewer is disposed
    Ignored,
}

/// Resources built for one pose.
struct Generation<S> {
    id: u64,
    scene: SceneHandle,
    surface: S,
    render_loop: RenderLoop,
    handle: LoopHandle,
}

/// 3D skeleton viewer bound to one container.
pub struct Skeleton3D<C: Container> {
    container: C,
    scene_manager: SceneManager,
    viewport: ViewportController,
    state: LifecycleState,
    current: Option<Generation<C::Surface>>,
    pending: Option<PoseData>,
    last_generation: u64,
}

impl<C: Container> Skeleton3D<C> {
    pub fn new(container: C, config: ViewerConfig) -> Self {
        let viewport = ViewportController::new(container.size(), &config.camera, &config.controls);
        Self {
            container,
            scene_manager: SceneManager::new(&config),
            viewport,
            state: LifecycleState::Empty,
            current: None,
            pending: None,
            last_generation: 0,
        }
    }

    /// Replaces whatever is shown with `pose`.
    pub fn update(&mut self, pose: PoseData) -> UpdateOutcome {
        if self.state == LifecycleState::Disposed {
            debug!("update after dispose ignored");
            return UpdateOutcome::Ignored;
        }

        if !self.viewport.is_ready() || !self.container.is_ready() {
            let (width, height) = self.viewport.current_size();
            debug!("container is {}x{}, holding pose until it is laid out", width, height);
            self.pending = Some(pose);
            return UpdateOutcome::Deferred;
        }

        self.pending = None;
        self.mount(pose)
    }

    /// Parses a backend response and shows it.
    pub fn update_json(&mut self, json: &str) -> UpdateOutcome {
        if self.state == LifecycleState::Disposed {
            debug!("update after dispose ignored");
            return UpdateOutcome::Ignored;
        }

        match PoseData::from_json(json) {
            Ok(pose) => self.update(pose),
            Err(err) => {
                warn!("pose rejected: {}", err);
                UpdateOutcome::Rejected(err)
            }
        }
    }

    /// Follows a container size change.
    ///
    /// Returns the outcome of showing a deferred pose if the new size let it
    /// through.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<UpdateOutcome> {
        if self.state == LifecycleState::Disposed {
            debug!("resize after dispose ignored");
            return None;
        }

        let surface = self.current.as_mut().map(|generation| &mut generation.surface);
        if !self.viewport.resize(width, height, surface) {
            return None;
        }

        if self.pending.is_some() && self.container.is_ready() {
            let pose = self.pending.take()?;
            return Some(self.mount(pose));
        }

        if self.current.is_some() {
            self.container.request_frame();
        }
        None
    }

    /// Forwards pointer input to the camera controls.
    pub fn handle_input(&mut self, input: PointerInput) -> bool {
        if self.current.is_none() {
            return false;
        }
        let changed = self.viewport.handle_input(input);
        if changed {
            self.container.request_frame();
        }
        changed
    }

    /// Runs one display refresh for the current generation.
    pub fn frame(&mut self) -> Option<FrameOutcome> {
        let generation = self.current.as_mut()?;
        let (camera, controls) = self.viewport.frame_parts();
        let outcome = generation.render_loop.tick(FrameContext {
            camera,
            controls,
            surface: &mut generation.surface,
        });
        Some(outcome)
    }

    /// True when the render loop wants the next display refresh
    pub fn frame_pending(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|generation| generation.render_loop.is_scheduled())
    }

    /// Releases everything. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            debug!("viewer already disposed");
            return;
        }

        self.teardown();
        self.pending = None;
        self.viewport.detach();
        self.state = LifecycleState::Disposed;
        info!("viewer disposed after {} generations", self.last_generation);
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn scene(&self) -> Option<&SceneHandle> {
        self.current.as_ref().map(|generation| &generation.scene)
    }

    /// Id of the live generation
    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(|generation| generation.id)
    }

    /// Stop handle for the live generation's render loop
    pub fn loop_handle(&self) -> Option<LoopHandle> {
        self.current.as_ref().map(|generation| generation.handle.clone())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    fn mount(&mut self, pose: PoseData) -> UpdateOutcome {
        let replacing = self.current.is_some();
        if replacing {
            self.state = LifecycleState::Rebuilding;
            self.teardown();
        }

        let scene = self.scene_manager.rebuild(&pose);

        let mut surface = match self.container.attach_surface() {
            Ok(surface) => surface,
            Err(SurfaceError::NotReady { width, height }) => {
                debug!("container reported {}x{} while attaching, deferring", width, height);
                self.pending = Some(pose);
                self.state = LifecycleState::Empty;
                return UpdateOutcome::Deferred;
            }
            Err(err) => {
                warn!("could not attach a drawing surface: {}", err);
                self.state = LifecycleState::Empty;
                return UpdateOutcome::Failed(err);
            }
        };

        let (width, height) = self.viewport.current_size();
        if surface.size() != (width, height) {
            surface.resize(width, height);
        }
        surface.upload(&scene);
        self.viewport.bind_controls(surface.id());

        self.last_generation += 1;
        let id = self.last_generation;
        let (render_loop, handle) = RenderLoop::start(id);

        info!(
            "generation {} mounted on surface {:?}: {} joints, {} bones",
            id,
            surface.id(),
            scene.joints().len(),
            scene.bones().len()
        );
        if !scene.report().is_complete() {
            debug!("generation {} build report: {:?}", id, scene.report());
        }

        self.current = Some(Generation {
            id,
            scene,
            surface,
            render_loop,
            handle,
        });
        self.state = LifecycleState::Active;
        self.container.request_frame();

        if replacing {
            UpdateOutcome::Rebuilt { generation: id }
        } else {
            UpdateOutcome::Activated { generation: id }
        }
    }

    /// Stops and releases the live generation, if any.
    fn teardown(&mut self) {
        let Some(generation) = self.current.take() else {
            return;
        };

        generation.handle.stop();
        self.viewport.unbind_controls();
        debug!(
            "generation {} torn down after {} frames",
            generation.id,
            generation.render_loop.frames_drawn()
        );
        self.container.detach_surface(generation.surface);
    }
}

impl<C: Container> Drop for Skeleton3D<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}
