//! `winit` window hosting a `wgpu` surface.
//!
//! The adapter and device are requested on the first attach and reused by
//! every later generation; each generation gets its own `wgpu::Surface`.

use std::sync::Arc;

use log::{debug, info};
use winit::window::Window;

use super::{Container, RenderSurface, SurfaceId};
use crate::{config::SkeletonConfig, error::SurfaceError, gfx::rendering::RenderEngine};

struct GpuContext {
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

pub struct WindowContainer {
    window: Arc<Window>,
    instance: wgpu::Instance,
    gpu: Option<GpuContext>,
    detail: SkeletonConfig,
    next_id: u64,
}

impl WindowContainer {
    /// `detail` sets the tessellation of the joint and bone meshes
    pub fn new(window: Arc<Window>, detail: &SkeletonConfig) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        Self {
            window,
            instance,
            gpu: None,
            detail: detail.clone(),
            next_id: 0,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    fn gpu_for(&mut self, surface: &wgpu::Surface<'_>) -> Result<&GpuContext, SurfaceError> {
        if self.gpu.is_none() {
            let adapter = pollster::block_on(self.instance.request_adapter(
                &wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: Some(surface),
                    force_fallback_adapter: false,
                },
            ))
            .map_err(|err| SurfaceError::Adapter(err.to_string()))?;

            let (device, queue) = pollster::block_on(adapter.request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: 4096,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                },
            ))
            .map_err(|err| SurfaceError::Device(err.to_string()))?;

            info!("using graphics adapter {}", adapter.get_info().name);
            self.gpu = Some(GpuContext {
                adapter,
                device: Arc::new(device),
                queue: Arc::new(queue),
            });
        }

        self.gpu
            .as_ref()
            .ok_or_else(|| SurfaceError::Device("graphics device unavailable".into()))
    }
}

impl Container for WindowContainer {
    type Surface = RenderEngine;

    fn size(&self) -> (u32, u32) {
        self.window.inner_size().into()
    }

    fn attach_surface(&mut self) -> Result<RenderEngine, SurfaceError> {
        let size = self.size();
        if !self.is_ready() {
            return Err(SurfaceError::NotReady {
                width: size.0,
                height: size.1,
            });
        }

        let surface = self
            .instance
            .create_surface(self.window.clone())
            .map_err(|err| SurfaceError::Creation(err.to_string()))?;

        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        let detail = self.detail.clone();
        let gpu = self.gpu_for(&surface)?;

        RenderEngine::new(
            id,
            surface,
            &gpu.adapter,
            gpu.device.clone(),
            gpu.queue.clone(),
            size,
            &detail,
        )
    }

    fn detach_surface(&mut self, surface: RenderEngine) {
        debug!("detaching surface {:?} from window", surface.id());
        drop(surface);
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }
}
