//! Frame orchestration: bind group layouts shared by every pipeline, the
//! bindable cache, and the per-frame render pass.

use glam::Mat4;

use crate::bindable::cache::BindableCache;
use crate::camera::Camera;
use crate::gfx::{BindContext, DepthTexture, RenderError, WgpuContext};
use crate::scene::Scene;

/// The four bind group layouts every shader in the crate is written
/// against. Group order is fixed: transform, material, light, texture.
pub struct Layouts {
    pub transform: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            transform: uniform_layout(device, "transform", wgpu::ShaderStages::VERTEX),
            material: uniform_layout(device, "material", wgpu::ShaderStages::FRAGMENT),
            light: uniform_layout(device, "light", wgpu::ShaderStages::FRAGMENT),
            texture: texture_layout(device),
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    name: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{name} bind group layout")),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture bind group layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub struct Renderer {
    pub layouts: Layouts,
    pub cache: BindableCache,
    depth: DepthTexture,
}

impl Renderer {
    pub fn new(ctx: &WgpuContext) -> Self {
        Self {
            layouts: Layouts::new(&ctx.device),
            cache: BindableCache::new(),
            depth: DepthTexture::new(&ctx.device, &ctx.surface_config),
        }
    }

    /// Must be called after the surface is reconfigured so the depth
    /// buffer matches the new surface extent.
    pub fn resize(&mut self, ctx: &WgpuContext) {
        self.depth = DepthTexture::new(&ctx.device, &ctx.surface_config);
    }

    pub fn render(
        &mut self,
        ctx: &WgpuContext,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        let frame = camera.frame(ctx.aspect_ratio());

        let surface_texture = ctx.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.03,
                            g: 0.03,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut bind_ctx = BindContext {
                pass: &mut pass,
                queue: &ctx.queue,
                frame: &frame,
                world: Mat4::IDENTITY,
            };
            scene.draw(&mut bind_ctx)?;
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
