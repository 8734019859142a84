use std::sync::Mutex;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use super::Bindable;
use crate::gfx::BindContext;

/// Bind group indices shared by every pipeline layout in the crate.
pub const GROUP_TRANSFORM: u32 = 0;
pub const GROUP_MATERIAL: u32 = 1;
pub const GROUP_LIGHT: u32 = 2;
pub const GROUP_TEXTURE: u32 = 3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialData {
    pub color: [f32; 4],
    pub specular_intensity: f32,
    pub specular_power: f32,
    pub _pad: [f32; 2],
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            specular_intensity: 0.6,
            specular_power: 30.0,
            _pad: [0.0; 2],
        }
    }
}

/// Per-object material constants.
///
/// Exclusively owned by one drawable (never cached): the payload is
/// live-editable through the accessors, and the next bind uploads the
/// latest written value.
pub struct MaterialUniform {
    uid: String,
    data: Mutex<MaterialData>,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MaterialUniform {
    pub fn generate_uid(tag: &str) -> String {
        format!("MaterialUniform#{tag}")
    }

    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        tag: &str,
        data: MaterialData,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("material buffer {tag}")),
            contents: bytemuck::bytes_of(&data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("material bind group {tag}")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uid: Self::generate_uid(tag),
            data: Mutex::new(data),
            buffer,
            bind_group,
        }
    }

    pub fn data(&self) -> MaterialData {
        *self.data.lock().unwrap()
    }

    pub fn set_color(&self, color: [f32; 4]) {
        self.data.lock().unwrap().color = color;
    }

    pub fn set_specular(&self, intensity: f32, power: f32) {
        let mut data = self.data.lock().unwrap();
        data.specular_intensity = intensity;
        data.specular_power = power;
    }
}

impl Bindable for MaterialUniform {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        let data = *self.data.lock().unwrap();
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&data));
        ctx.pass.set_bind_group(GROUP_MATERIAL, &self.bind_group, &[]);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightData {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub diffuse_color: [f32; 3],
    pub diffuse_intensity: f32,
    pub view_pos: [f32; 3],
    pub att_const: f32,
    pub att_lin: f32,
    pub att_quad: f32,
    pub _pad2: [f32; 2],
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            position: [0.0, 6.0, 0.0],
            _pad0: 0.0,
            ambient: [0.05, 0.05, 0.05],
            _pad1: 0.0,
            diffuse_color: [1.0, 1.0, 1.0],
            diffuse_intensity: 1.0,
            view_pos: [0.0; 3],
            att_const: 1.0,
            att_lin: 0.045,
            att_quad: 0.0075,
            _pad2: [0.0; 2],
        }
    }
}

/// Scene-wide point light constants, shared by every lit drawable through
/// the cache. The scene uploads fresh data once per frame; `bind` only
/// attaches the group.
pub struct LightUniform {
    uid: String,
    data: Mutex<LightData>,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LightUniform {
    pub fn generate_uid(tag: &str) -> String {
        format!("LightUniform#{tag}")
    }

    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        tag: &str,
        data: LightData,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("light buffer {tag}")),
            contents: bytemuck::bytes_of(&data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("light bind group {tag}")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uid: Self::generate_uid(tag),
            data: Mutex::new(data),
            buffer,
            bind_group,
        }
    }

    pub fn data(&self) -> LightData {
        *self.data.lock().unwrap()
    }

    pub fn set_position(&self, position: Vec3) {
        self.data.lock().unwrap().position = position.into();
    }

    pub fn set_diffuse(&self, color: [f32; 3], intensity: f32) {
        let mut data = self.data.lock().unwrap();
        data.diffuse_color = color;
        data.diffuse_intensity = intensity;
    }

    /// Uploads the current payload. Called once per frame before the pass
    /// draws anything lit.
    pub fn upload(&self, queue: &wgpu::Queue, view_pos: Vec3) {
        let mut data = self.data.lock().unwrap();
        data.view_pos = view_pos.into();
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&*data));
    }
}

impl Bindable for LightUniform {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        ctx.pass.set_bind_group(GROUP_LIGHT, &self.bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_payloads_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<MaterialData>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightData>() % 16, 0);
    }

    #[test]
    fn uniform_identities_derive_from_tag() {
        assert_ne!(
            MaterialUniform::generate_uid("box0"),
            MaterialUniform::generate_uid("box1"),
        );
        assert_eq!(LightUniform::generate_uid("scene"), "LightUniform#scene");
    }
}
