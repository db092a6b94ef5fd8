//! Global uniform bindings for camera and scene lighting
//!
//! One uniform buffer holds everything the shaders share across all
//! instances: the camera matrices and the three lights of the rig. It is
//! bound to slot 0 in both pipelines.

use crate::gfx::{camera::CameraUniform, scene::LightRig};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in `shader.wgsl`. Every field is a vec4 so
/// the layout needs no padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// rgb, intensity
    ambient: [f32; 4],
    key_direction: [f32; 4],
    /// rgb, intensity
    key_color: [f32; 4],
    fill_direction: [f32; 4],
    /// rgb, intensity; zero intensity when the rig has no fill light
    fill_color: [f32; 4],
}

impl GlobalUniform {
    pub fn set_camera(&mut self, camera: &CameraUniform) {
        self.view_position = camera.view_position;
        self.view_proj = camera.view_proj;
    }

    pub fn set_lights(&mut self, lights: &LightRig) {
        let [r, g, b] = lights.ambient.color;
        self.ambient = [r, g, b, lights.ambient.intensity];

        let [x, y, z] = lights.key.direction();
        self.key_direction = [x, y, z, 0.0];
        let [r, g, b] = lights.key.color;
        self.key_color = [r, g, b, lights.key.intensity];

        match lights.fill {
            Some(fill) => {
                let [x, y, z] = fill.direction();
                self.fill_direction = [x, y, z, 0.0];
                let [r, g, b] = fill.color;
                self.fill_color = [r, g, b, fill.intensity];
            }
            None => {
                self.fill_direction = [0.0, 1.0, 0.0, 0.0];
                self.fill_color = [0.0; 4];
            }
        }
    }
}

/// Uniform buffer, layout and bind group for [`GlobalUniform`]
pub struct GlobalBindings {
    content: GlobalUniform,
    /// Last content written to `buffer`
    uploaded: Option<GlobalUniform>,
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Uniform Buffer"),
            size: std::mem::size_of::<GlobalUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            content: GlobalUniform::default(),
            uploaded: None,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn set_lights(&mut self, queue: &wgpu::Queue, lights: &LightRig) {
        self.content.set_lights(lights);
        self.flush(queue);
    }

    /// Called every frame; unchanged cameras cost no upload
    pub fn update_camera(&mut self, queue: &wgpu::Queue, camera: &CameraUniform) {
        self.content.set_camera(camera);
        self.flush(queue);
    }

    fn flush(&mut self, queue: &wgpu::Queue) {
        if self.uploaded == Some(self.content) {
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.content));
        self.uploaded = Some(self.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{AmbientLight, DirectionalLight};

    #[test]
    fn test_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 4 * 4 * 10);
    }

    #[test]
    fn test_missing_fill_light_is_dark() {
        let rig = LightRig {
            ambient: AmbientLight::default(),
            key: DirectionalLight::default(),
            fill: None,
        };
        let mut content = GlobalUniform::default();
        content.set_lights(&rig);
        assert_eq!(content.fill_color, [0.0; 4]);
        assert_eq!(content.ambient, [1.0, 1.0, 1.0, 0.6]);

        let expected = 1.0 / 3f32.sqrt();
        for component in &content.key_direction[..3] {
            assert!((component - expected).abs() < 1e-6);
        }
    }
}
