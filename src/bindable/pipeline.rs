use super::shader::ShaderModule;
use super::vertex::Vertex;
use super::Bindable;
use crate::gfx::{BindContext, DepthTexture};

/// Complete fixed-function + shader-stage state for one kind of geometry.
///
/// D3D-style engines bind shader stages, input layout and topology as
/// separate pipeline slots; wgpu bakes all three into a render pipeline
/// object. Identity therefore derives from the shader name and topology,
/// the parameters that distinguish one baked pipeline from another (the
/// vertex layout is crate-wide).
pub struct PipelineState {
    uid: String,
    pipeline: wgpu::RenderPipeline,
}

impl PipelineState {
    pub fn generate_uid(shader_name: &str, topology: wgpu::PrimitiveTopology) -> String {
        format!("Pipeline#{shader_name}#{topology:?}")
    }

    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader: &ShaderModule,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        topology: wgpu::PrimitiveTopology,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("pipeline layout {}", shader.name())),
            bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("pipeline {}", shader.name())),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader.module(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader.module(),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTexture::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            uid: Self::generate_uid(shader.name(), topology),
            pipeline,
        }
    }
}

impl Bindable for PipelineState {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        ctx.pass.set_pipeline(&self.pipeline);
    }
}
