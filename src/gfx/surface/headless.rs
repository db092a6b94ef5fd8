//! In-memory container for running the viewer without a GPU.
//!
//! Every attach, detach, upload, resize and draw is written to a shared
//! [`Ledger`], which stays readable after the container has been moved into a
//! [`Skeleton3D`](crate::lifecycle::Skeleton3D).

use std::{cell::RefCell, rc::Rc};

use log::debug;

use super::{Container, RenderSurface, SurfaceId};
use crate::{
    error::{FrameError, SurfaceError},
    gfx::{camera::CameraUniform, scene::SceneHandle},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Attached(SurfaceId),
    Detached(SurfaceId),
    /// Surface received a scene with this many primitives
    Uploaded(SurfaceId, usize),
    Resized(SurfaceId, u32, u32),
}

#[derive(Debug, Default)]
struct LedgerState {
    attached: Vec<SurfaceId>,
    peak_attached: usize,
    events: Vec<SurfaceEvent>,
    draws: u64,
    frame_requests: u64,
    failing_frames: u32,
    last_camera: Option<CameraUniform>,
}

/// Shared record of what happened to a headless container's surfaces.
#[derive(Debug, Clone, Default)]
pub struct Ledger(Rc<RefCell<LedgerState>>);

impl Ledger {
    /// Surfaces attached and not yet detached
    pub fn attached(&self) -> Vec<SurfaceId> {
        self.0.borrow().attached.clone()
    }

    pub fn attached_count(&self) -> usize {
        self.0.borrow().attached.len()
    }

    /// Most surfaces ever attached at the same time
    pub fn peak_attached(&self) -> usize {
        self.0.borrow().peak_attached
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.0.borrow().events.clone()
    }

    pub fn draws(&self) -> u64 {
        self.0.borrow().draws
    }

    pub fn frame_requests(&self) -> u64 {
        self.0.borrow().frame_requests
    }

    pub fn last_camera(&self) -> Option<CameraUniform> {
        self.0.borrow().last_camera
    }

    /// Makes the next `count` draws fail with [`FrameError::Lost`]
    pub fn fail_next_frames(&self, count: u32) {
        self.0.borrow_mut().failing_frames = count;
    }

    fn record(&self, event: SurfaceEvent) {
        let mut state = self.0.borrow_mut();
        match &event {
            SurfaceEvent::Attached(id) => {
                state.attached.push(*id);
                state.peak_attached = state.peak_attached.max(state.attached.len());
            }
            SurfaceEvent::Detached(id) => state.attached.retain(|attached| attached != id),
            _ => {}
        }
        state.events.push(event);
    }
}

pub struct HeadlessContainer {
    width: u32,
    height: u32,
    connected: bool,
    next_id: u64,
    ledger: Ledger,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            connected: true,
            next_id: 0,
            ledger: Ledger::default(),
        }
    }

    pub fn ledger(&self) -> Ledger {
        self.ledger.clone()
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Simulates the container being removed out from under the viewer
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl Container for HeadlessContainer {
    type Surface = HeadlessSurface;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn attach_surface(&mut self) -> Result<HeadlessSurface, SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::NotReady {
                width: self.width,
                height: self.height,
            });
        }
        if !self.connected {
            return Err(SurfaceError::Creation("container is disconnected".into()));
        }

        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.ledger.record(SurfaceEvent::Attached(id));

        Ok(HeadlessSurface {
            id,
            width: self.width,
            height: self.height,
            primitives: 0,
            ledger: self.ledger.clone(),
        })
    }

    fn detach_surface(&mut self, surface: HeadlessSurface) {
        if !self.connected {
            debug!("container already disconnected, dropping surface {:?}", surface.id);
        }
        self.ledger.record(SurfaceEvent::Detached(surface.id));
    }

    fn request_frame(&self) {
        self.ledger.0.borrow_mut().frame_requests += 1;
    }
}

pub struct HeadlessSurface {
    id: SurfaceId,
    width: u32,
    height: u32,
    primitives: usize,
    ledger: Ledger,
}

impl HeadlessSurface {
    /// Primitive count of the uploaded scene
    pub fn primitives(&self) -> usize {
        self.primitives
    }
}

impl RenderSurface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.ledger
            .record(SurfaceEvent::Resized(self.id, width, height));
    }

    fn upload(&mut self, scene: &SceneHandle) {
        self.primitives = scene.primitive_count();
        self.ledger
            .record(SurfaceEvent::Uploaded(self.id, self.primitives));
    }

    fn draw(&mut self, camera: &CameraUniform) -> Result<(), FrameError> {
        let mut state = self.ledger.0.borrow_mut();
        if state.failing_frames > 0 {
            state.failing_frames -= 1;
            return Err(FrameError::Lost);
        }
        state.draws += 1;
        state.last_camera = Some(*camera);
        Ok(())
    }
}
