use std::sync::Arc;

use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    error::EventLoopError,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    gfx::{
        camera::{PointerButton, PointerInput},
        rendering::FrameOutcome,
        surface::{Container, WindowContainer},
    },
    lifecycle::{Skeleton3D, UpdateOutcome},
    pose::PoseData,
};

/// Pixel scroll is converted to lines at this rate
const PIXELS_PER_LINE: f32 = 40.0;

/// Desktop window showing the latest pose.
///
/// Poses arrive either up front ([`ViewerApp::with_pose`]) or as user events
/// sent through the [`EventLoopProxy`] handed to [`ViewerApp::run_with`].
pub struct ViewerApp {
    config: ViewerConfig,
    title: String,
    pending_pose: Option<PoseData>,
    viewer: Option<Skeleton3D<WindowContainer>>,
    cursor: Option<PhysicalPosition<f64>>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            title: "Skeleton 3D".to_string(),
            pending_pose: None,
            viewer: None,
            cursor: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Pose shown as soon as the window is up
    pub fn with_pose(mut self, pose: PoseData) -> Self {
        self.pending_pose = Some(pose);
        self
    }

    /// Runs the event loop until the window is closed
    pub fn run(self) -> Result<(), EventLoopError> {
        self.run_with(|_| {})
    }

    /// Runs the event loop, first giving `setup` a proxy for sending new poses
    pub fn run_with<F>(mut self, setup: F) -> Result<(), EventLoopError>
    where
        F: FnOnce(EventLoopProxy<PoseData>),
    {
        let event_loop = EventLoop::<PoseData>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        setup(event_loop.create_proxy());
        event_loop.run_app(&mut self)
    }

    fn show(&mut self, pose: PoseData) {
        let Some(viewer) = self.viewer.as_mut() else {
            self.pending_pose = Some(pose);
            return;
        };

        match viewer.update(pose) {
            UpdateOutcome::Failed(err) => error!("cannot show pose: {}", err),
            UpdateOutcome::Deferred => info!("window not laid out yet, pose deferred"),
            _ => {}
        }
    }

    fn pointer_input(&mut self, event: &WindowEvent) -> Option<PointerInput> {
        let input = match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return None,
                };
                match state {
                    ElementState::Pressed => PointerInput::Pressed(button),
                    ElementState::Released => PointerInput::Released(button),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position)?;
                PointerInput::Moved {
                    dx: (position.x - previous.x) as f32,
                    dy: (position.y - previous.y) as f32,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                PointerInput::Left
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => PointerInput::Scrolled(*y),
                MouseScrollDelta::PixelDelta(position) => {
                    PointerInput::Scrolled(position.y as f32 / PIXELS_PER_LINE)
                }
            },
            _ => return None,
        };
        Some(input)
    }
}

impl ApplicationHandler<PoseData> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1200, 800));
        let window: Arc<Window> = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let container = WindowContainer::new(window, &self.config.skeleton);
        self.viewer = Some(Skeleton3D::new(container, self.config.clone()));

        if let Some(pose) = self.pending_pose.take() {
            self.show(pose);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, pose: PoseData) {
        self.show(pose);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(input) = self.pointer_input(&event) {
            if let Some(viewer) = self.viewer.as_mut() {
                viewer.handle_input(input);
            }
            return;
        }

        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(UpdateOutcome::Failed(err)) = viewer.resize(width, height) {
                    error!("cannot show deferred pose: {}", err);
                }
            }
            WindowEvent::CloseRequested => {
                viewer.dispose();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Some(FrameOutcome::Cancelled) = viewer.frame() {
                    debug!("render loop stopped, no more frames");
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_ref() {
            if viewer.frame_pending() {
                viewer.container().request_frame();
            }
        }
    }
}
