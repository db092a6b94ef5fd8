use std::{iter, sync::Arc};

use log::{debug, info};
use wgpu::{util::DeviceExt, Buffer, DepthStencilState, RenderPipeline, TextureFormat};

use crate::{
    config::SkeletonConfig,
    error::{FrameError, SurfaceError},
    gfx::{
        camera::CameraUniform,
        geometry::{generate_cylinder, generate_sphere, GeometryData},
        resources::{GlobalBindings, TextureResource},
        scene::{InstanceRaw, LineVertex, SceneHandle, Vertex3D},
        surface::{RenderSurface, SurfaceId},
    },
};

/// Shared unit mesh drawn once per instance
struct MeshBuffers {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, geometry: &GeometryData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&geometry.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }
}

/// Vertex data and count; `None` when there is nothing to draw
struct CountedBuffer {
    buffer: Buffer,
    count: u32,
}

impl CountedBuffer {
    fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        items: &[T],
        usage: wgpu::BufferUsages,
        label: &str,
    ) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(items),
            usage,
        });
        Some(Self {
            buffer,
            count: items.len() as u32,
        })
    }
}

/// GPU copy of one [`SceneHandle`]
struct SceneBuffers {
    clear_color: wgpu::Color,
    joints: Option<CountedBuffer>,
    bones: Option<CountedBuffer>,
    grid: Option<CountedBuffer>,
}

/// Drawing surface backed by a `wgpu` swap chain.
pub struct RenderEngine {
    id: SurfaceId,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,

    mesh_pipeline: RenderPipeline,
    line_pipeline: RenderPipeline,
    global_bindings: GlobalBindings,

    sphere: MeshBuffers,
    cylinder: MeshBuffers,
    scene: Option<SceneBuffers>,
}

impl RenderEngine {
    /// Configures `surface` and builds the pipelines and unit meshes.
    pub fn new(
        id: SurfaceId,
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        (width, height): (u32, u32),
        detail: &SkeletonConfig,
    ) -> Result<RenderEngine, SurfaceError> {
        let surface_capabilities = surface.get_capabilities(adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| SurfaceError::Creation("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: surface_capabilities
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_bindings = GlobalBindings::new(&device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skeleton Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skeleton Pipeline Layout"),
            bind_group_layouts: &[global_bindings.layout()],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            ("vs_main", "fs_main"),
            &[Vertex3D::desc(), InstanceRaw::desc()],
            wgpu::PrimitiveTopology::TriangleList,
            "Mesh Pipeline",
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            ("vs_line", "fs_line"),
            &[LineVertex::desc()],
            wgpu::PrimitiveTopology::LineList,
            "Grid Pipeline",
        );

        let sphere = MeshBuffers::new(
            &device,
            &generate_sphere(detail.sphere_segments, detail.sphere_segments),
            "Joint Sphere",
        );
        let cylinder = MeshBuffers::new(
            &device,
            &generate_cylinder(detail.cylinder_segments),
            "Bone Cylinder",
        );

        info!("surface {:?} configured at {}x{} ({:?})", id, width, height, format);

        Ok(RenderEngine {
            id,
            surface,
            device,
            queue,
            config,
            depth_texture,
            mesh_pipeline,
            line_pipeline,
            global_bindings,
            sphere,
            cylinder,
            scene: None,
        })
    }

    fn reconfigure(&mut self) {
        self.depth_texture = configure_surface(&self.surface, &self.device, &self.config);
    }
}

impl RenderSurface for RenderEngine {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn upload(&mut self, scene: &SceneHandle) {
        self.global_bindings.set_lights(&self.queue, &scene.lights);

        let [r, g, b] = scene.background;
        let buffers = SceneBuffers {
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            joints: CountedBuffer::new(
                &self.device,
                &scene.joint_instances(),
                wgpu::BufferUsages::VERTEX,
                "Joint Instance Buffer",
            ),
            bones: CountedBuffer::new(
                &self.device,
                &scene.bone_instances(),
                wgpu::BufferUsages::VERTEX,
                "Bone Instance Buffer",
            ),
            grid: CountedBuffer::new(
                &self.device,
                &scene.grid.vertices(),
                wgpu::BufferUsages::VERTEX,
                "Grid Vertex Buffer",
            ),
        };

        debug!(
            "surface {:?} uploaded {} primitives",
            self.id,
            scene.primitive_count()
        );
        self.scene = Some(buffers);
    }

    fn draw(&mut self, camera: &CameraUniform) -> Result<(), FrameError> {
        let Some(scene) = self.scene.as_ref() else {
            return Ok(());
        };

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                let error = acquire_error(err);
                if matches!(error, FrameError::Lost) {
                    self.depth_texture =
                        configure_surface(&self.surface, &self.device, &self.config);
                }
                return Err(error);
            }
        };

        self.global_bindings.update_camera(&self.queue, camera);

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(grid) = &scene.grid {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, grid.buffer.slice(..));
                render_pass.draw(0..grid.count, 0..1);
            }

            render_pass.set_pipeline(&self.mesh_pipeline);
            for (mesh, instances) in [(&self.sphere, &scene.joints), (&self.cylinder, &scene.bones)]
            {
                let Some(instances) = instances else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, instances.buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..instances.count);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        info!("surface {:?} released", self.id);
    }
}

/// Applies `config` to `surface` and returns a matching depth buffer
fn configure_surface(
    surface: &wgpu::Surface<'static>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> TextureResource {
    surface.configure(device, config);
    TextureResource::create_depth_texture(device, config, "depth_texture")
}

/// Lost and outdated surfaces both come back as [`FrameError::Lost`]; the
/// caller reconfigures before the next frame.
fn acquire_error(err: wgpu::SurfaceError) -> FrameError {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameError::Lost,
        wgpu::SurfaceError::Timeout => FrameError::Timeout,
        wgpu::SurfaceError::OutOfMemory => FrameError::OutOfMemory,
        other => FrameError::Other(other.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: TextureFormat,
    (vertex_entry, fragment_entry): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vertex_entry),
            buffers,
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_error_mapping() {
        assert!(matches!(acquire_error(wgpu::SurfaceError::Lost), FrameError::Lost));
        assert!(matches!(acquire_error(wgpu::SurfaceError::Outdated), FrameError::Lost));
        assert!(matches!(acquire_error(wgpu::SurfaceError::Timeout), FrameError::Timeout));
        assert!(matches!(
            acquire_error(wgpu::SurfaceError::OutOfMemory),
            FrameError::OutOfMemory
        ));
        assert!(matches!(acquire_error(wgpu::SurfaceError::Other), FrameError::Other(_)));
    }
}
