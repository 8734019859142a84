use wgpu::util::DeviceExt;

use super::vertex::Vertex;
use super::Bindable;
use crate::gfx::BindContext;

/// FNV-1a over the raw index bytes. Identity must be stable across runs,
/// which rules out the randomly seeded std hasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x1_0000_01b3);
    }
    hash
}

pub struct VertexBuffer {
    uid: String,
    buffer: wgpu::Buffer,
}

impl VertexBuffer {
    pub fn generate_uid(tag: &str) -> String {
        format!("VertexBuffer#{tag}")
    }

    pub fn new(device: &wgpu::Device, tag: &str, vertices: &[Vertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("vertex buffer {tag}")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            uid: Self::generate_uid(tag),
            buffer,
        }
    }
}

impl Bindable for VertexBuffer {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        ctx.pass.set_vertex_buffer(0, self.buffer.slice(..));
    }
}

/// Index buffer bindable. The drawable records its count for the final
/// `draw_indexed` call.
///
/// Identity incorporates both the tag and a hash of the index contents:
/// tag-only identity would silently alias differing buffers sharing a tag.
pub struct IndexBuffer {
    uid: String,
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    pub fn generate_uid(tag: &str, indices: &[u32]) -> String {
        let hash = fnv1a(bytemuck::cast_slice(indices));
        format!("IndexBuffer#{tag}#{hash:016x}")
    }

    pub fn new(device: &wgpu::Device, tag: &str, indices: &[u32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("index buffer {tag}")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            uid: Self::generate_uid(tag, indices),
            buffer,
            count: indices.len() as u32,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Bindable for IndexBuffer {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn bind(&self, ctx: &mut BindContext<'_, '_>) {
        ctx.pass
            .set_index_buffer(self.buffer.slice(..), wgpu::IndexFormat::Uint32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANE: [u32; 6] = [0, 1, 2, 0, 2, 3];

    #[test]
    fn equal_tag_and_indices_give_equal_identity() {
        assert_eq!(
            IndexBuffer::generate_uid("plane", &PLANE),
            IndexBuffer::generate_uid("plane", &PLANE),
        );
    }

    #[test]
    fn differing_tag_gives_distinct_identity() {
        assert_ne!(
            IndexBuffer::generate_uid("plane", &PLANE),
            IndexBuffer::generate_uid("plane2", &PLANE),
        );
    }

    #[test]
    fn differing_indices_give_distinct_identity() {
        let flipped: [u32; 6] = [0, 2, 1, 0, 3, 2];
        assert_ne!(
            IndexBuffer::generate_uid("plane", &PLANE),
            IndexBuffer::generate_uid("plane", &flipped),
        );
    }

    #[test]
    fn vertex_buffer_identity_derives_from_tag() {
        assert_eq!(VertexBuffer::generate_uid("cube"), "VertexBuffer#cube");
        assert_ne!(
            VertexBuffer::generate_uid("cube"),
            VertexBuffer::generate_uid("sphere"),
        );
    }
}
