use glam::{Mat4, Vec3};

/// Camera state for the frame being recorded.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub camera_pos: Vec3,
}

/// Everything a bindable needs while the render pass is open.
///
/// `world` is the transform of the object currently being drawn; the
/// drawable sets it before walking its bind list, so transform bindables
/// read it from here instead of holding a pointer back to their owner.
pub struct BindContext<'a, 'p> {
    pub pass: &'a mut wgpu::RenderPass<'p>,
    pub queue: &'a wgpu::Queue,
    pub frame: &'a FrameContext,
    pub world: Mat4,
}
