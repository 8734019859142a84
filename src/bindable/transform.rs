use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::uniform::GROUP_TRANSFORM;
use super::Bindable;
use crate::gfx::BindContext;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformData {
    mvp: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

/// Per-object transform constants, recomputed on every bind.
///
/// The one bindable whose content is not static: each bind composes the
/// model-view-projection matrix from the world transform and camera state
/// carried by the [`BindContext`]. Always exclusively owned by one
/// drawable, never resolved through the cache.
pub struct TransformUniform {
    uid: String,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TransformUniform {
    pub fn generate_uid(tag: &str) -> String {
        format!("TransformUniform#{tag}")
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, tag: &str) -> Self {
        let data = TransformData {
            mvp: glam::Mat4::IDENTITY.to_cols_array_2d(),
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("transform buffer {tag}")),
            contents: bytemuck::bytes_of(&data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("transform bind group {tag}")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uid: Self::generate_uid(tag),
            buffer,
            bind_group,
        }
    }
}

impl Bindable for TransformUniform {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        let data = TransformData {
            mvp: (ctx.frame.view_proj * ctx.world).to_cols_array_2d(),
            model: ctx.world.to_cols_array_2d(),
        };
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(&data));
        ctx.pass
            .set_bind_group(GROUP_TRANSFORM, &self.bind_group, &[]);
    }
}
