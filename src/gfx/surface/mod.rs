//! # Containers and Drawing Surfaces
//!
//! A [`Container`] is a sized region that can host one GPU drawing surface at a
//! time: a window, or an in-memory stand-in. Surfaces are handed back to the
//! container by value when a generation ends, so a surface cannot be released
//! twice and the container always knows how many are attached.
//!
//! - [`HeadlessContainer`] records attach/detach/draw activity without a GPU
//! - [`WindowContainer`] hosts a `wgpu` surface in a `winit` window

pub mod headless;
pub mod window;

pub use headless::{HeadlessContainer, HeadlessSurface, Ledger, SurfaceEvent};
pub use window::WindowContainer;

use crate::{
    error::{FrameError, SurfaceError},
    gfx::{camera::CameraUniform, scene::SceneHandle},
};

/// Identifies one drawing surface for the lifetime of its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// GPU-backed target that frames are drawn onto.
pub trait RenderSurface {
    fn id(&self) -> SurfaceId;

    fn size(&self) -> (u32, u32);

    /// Resizes the drawing buffers. Zero-area sizes are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Creates the GPU buffers for a scene. Called once per generation.
    fn upload(&mut self, scene: &SceneHandle);

    /// Draws the uploaded scene from the given camera.
    fn draw(&mut self, camera: &CameraUniform) -> Result<(), FrameError>;
}

/// Sized host for a drawing surface.
pub trait Container {
    type Surface: RenderSurface;

    /// Current size in physical pixels
    fn size(&self) -> (u32, u32);

    /// Zero width or height means the container is not laid out yet
    fn is_ready(&self) -> bool {
        let (width, height) = self.size();
        width > 0 && height > 0
    }

    fn attach_surface(&mut self) -> Result<Self::Surface, SurfaceError>;

    /// Releases a surface. Must tolerate a container that is already gone.
    fn detach_surface(&mut self, surface: Self::Surface);

    /// Asks for a frame callback at the next display refresh.
    fn request_frame(&self) {}
}
