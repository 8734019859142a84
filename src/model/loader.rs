//! glTF import. Geometry buffers and textures are deduplicated through the
//! bindable cache; transform and material uniforms are created fresh for
//! every primitive so each draw owns the buffers it writes during a frame.

use std::path::Path;
use std::sync::Arc;

use glam::Mat4;

use crate::bindable::buffer::{IndexBuffer, VertexBuffer};
use crate::bindable::cache::BindableCache;
use crate::bindable::pipeline::PipelineState;
use crate::bindable::shader::ShaderModule;
use crate::bindable::texture::TextureBinding;
use crate::bindable::transform::TransformUniform;
use crate::bindable::uniform::{LightUniform, MaterialData, MaterialUniform};
use crate::bindable::vertex::Vertex;
use crate::bindable::SharedBindable;
use crate::drawable::Drawable;
use crate::gfx::{GfxError, WgpuContext};
use crate::renderer::Layouts;

use super::{Mesh, Model, Node, NodeId};

pub fn load_gltf(
    ctx: &WgpuContext,
    cache: &mut BindableCache,
    layouts: &Layouts,
    light: &Arc<LightUniform>,
    path: &Path,
) -> Result<Model, GfxError> {
    let (document, buffers, images) = gltf::import(path).map_err(|source| GfxError::ModelLoad {
        path: path.to_path_buf(),
        source,
    })?;
    if document.meshes().len() == 0 {
        return Err(GfxError::EmptyModel(path.to_path_buf()));
    }

    let tag = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_owned());
    log::info!(
        "loading {:?}: {} meshes, {} nodes, {} images",
        path,
        document.meshes().len(),
        document.nodes().len(),
        images.len()
    );

    let mut loader = Loader {
        ctx,
        cache,
        layouts,
        light,
        buffers: &buffers,
        images: &images,
        tag,
        meshes: Vec::new(),
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| GfxError::EmptyModel(path.to_path_buf()))?;
    let (nodes, roots) = build_arena(&scene, &mut |node, mesh, prim_index, primitive| {
        loader.build_primitive(node, mesh, prim_index, primitive)
    })?;

    Ok(Model {
        meshes: loader.meshes,
        nodes,
        roots,
    })
}

/// Converts a glTF scene's node structure into the arena form: children by
/// index, roots in scene order. Mesh construction is delegated so the walk
/// itself stays free of GPU resources.
fn build_arena<F>(
    scene: &gltf::Scene<'_>,
    build_mesh: &mut F,
) -> Result<(Vec<Node>, Vec<NodeId>), GfxError>
where
    F: FnMut(&gltf::Node<'_>, &gltf::Mesh<'_>, usize, &gltf::Primitive<'_>) -> Result<usize, GfxError>,
{
    let mut nodes = Vec::new();
    let mut roots = Vec::new();
    for node in scene.nodes() {
        roots.push(add_node(&mut nodes, &node, build_mesh)?);
    }
    Ok((nodes, roots))
}

fn add_node<F>(
    nodes: &mut Vec<Node>,
    node: &gltf::Node<'_>,
    build_mesh: &mut F,
) -> Result<NodeId, GfxError>
where
    F: FnMut(&gltf::Node<'_>, &gltf::Mesh<'_>, usize, &gltf::Primitive<'_>) -> Result<usize, GfxError>,
{
    let name = node
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("node{}", node.index()));
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());

    let mut mesh_ids = Vec::new();
    if let Some(mesh) = node.mesh() {
        for (prim_index, primitive) in mesh.primitives().enumerate() {
            mesh_ids.push(build_mesh(node, &mesh, prim_index, &primitive)?);
        }
    }

    let mut children = Vec::new();
    for child in node.children() {
        children.push(add_node(nodes, &child, build_mesh)?);
    }

    nodes.push(Node {
        name,
        transform,
        meshes: mesh_ids,
        children,
    });
    Ok(nodes.len() - 1)
}

struct Loader<'a> {
    ctx: &'a WgpuContext,
    cache: &'a mut BindableCache,
    layouts: &'a Layouts,
    light: &'a Arc<LightUniform>,
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    tag: String,
    meshes: Vec<Mesh>,
}

impl Loader<'_> {
    fn build_primitive(
        &mut self,
        node: &gltf::Node<'_>,
        mesh: &gltf::Mesh<'_>,
        prim_index: usize,
        primitive: &gltf::Primitive<'_>,
    ) -> Result<usize, GfxError> {
        let mesh_name = mesh
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));
        let geometry_tag = format!("{}/{}.{}", self.tag, mesh_name, prim_index);

        let reader = primitive.reader(|b| self.buffers.get(b.index()).map(|d| d.0.as_slice()));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| GfxError::MissingAttribute {
                mesh: geometry_tag.clone(),
                attribute: "POSITION",
            })?
            .collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .ok_or_else(|| GfxError::MissingAttribute {
                mesh: geometry_tag.clone(),
                attribute: "NORMAL",
            })?
            .collect();
        let tex_coords: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().collect());
        let indices: Vec<u32> = reader
            .read_indices()
            .ok_or_else(|| GfxError::MissingAttribute {
                mesh: geometry_tag.clone(),
                attribute: "indices",
            })?
            .into_u32()
            .collect();

        let vertices = build_vertices(&geometry_tag, &positions, &normals, tex_coords.as_deref())?;

        let device = &self.ctx.device;
        let vertex_buffer = self
            .cache
            .resolve(&VertexBuffer::generate_uid(&geometry_tag), || {
                Ok(VertexBuffer::new(device, &geometry_tag, &vertices))
            })?;
        let index_buffer = self
            .cache
            .resolve(&IndexBuffer::generate_uid(&geometry_tag, &indices), || {
                Ok(IndexBuffer::new(device, &geometry_tag, &indices))
            })?;

        let pbr = primitive.material().pbr_metallic_roughness();
        let texture = match pbr.base_color_texture() {
            Some(info) if tex_coords.is_some() => Some(self.resolve_texture(&info)?),
            _ => None,
        };

        let shader_name = if texture.is_some() {
            "phong_textured"
        } else {
            "phong"
        };
        let pipeline = self.resolve_pipeline(shader_name, texture.is_some())?;

        // fresh uniforms per primitive, see module docs
        let instance_tag = format!("{}/node{}.{}", self.tag, node.index(), prim_index);
        let device = &self.ctx.device;
        let transform = TransformUniform::new(device, &self.layouts.transform, &instance_tag);
        let material = MaterialUniform::new(
            device,
            &self.layouts.material,
            &instance_tag,
            MaterialData {
                color: pbr.base_color_factor(),
                ..MaterialData::default()
            },
        );

        let mut drawable = Drawable::new();
        drawable.add_bind(pipeline as SharedBindable);
        drawable.add_bind(vertex_buffer as SharedBindable);
        drawable.add_bind(Arc::new(transform) as SharedBindable);
        drawable.add_bind(Arc::new(material) as SharedBindable);
        drawable.add_bind(self.light.clone() as SharedBindable);
        if let Some(texture) = texture {
            drawable.add_bind(texture as SharedBindable);
        }
        drawable.set_index_buffer(index_buffer);

        self.meshes.push(Mesh {
            name: format!("{mesh_name}.{prim_index}"),
            drawable,
        });
        Ok(self.meshes.len() - 1)
    }

    fn resolve_pipeline(
        &mut self,
        shader_name: &str,
        textured: bool,
    ) -> Result<Arc<PipelineState>, GfxError> {
        let device = &self.ctx.device;
        let shader = self
            .cache
            .resolve(&ShaderModule::generate_uid(shader_name), || {
                ShaderModule::new(device, shader_name)
            })?;

        let topology = wgpu::PrimitiveTopology::TriangleList;
        let mut group_layouts = vec![
            &self.layouts.transform,
            &self.layouts.material,
            &self.layouts.light,
        ];
        if textured {
            group_layouts.push(&self.layouts.texture);
        }
        let format = self.ctx.surface_config.format;
        self.cache
            .resolve(&PipelineState::generate_uid(shader_name, topology), || {
                Ok(PipelineState::new(
                    device,
                    format,
                    &shader,
                    &group_layouts,
                    topology,
                ))
            })
    }

    fn resolve_texture(
        &mut self,
        info: &gltf::texture::Info<'_>,
    ) -> Result<Arc<TextureBinding>, GfxError> {
        let image_index = info.texture().source().index();
        let image_tag = format!("{}/image{image_index}", self.tag);
        let data = &self.images[image_index];
        let device = &self.ctx.device;
        let queue = &self.ctx.queue;
        let layout = &self.layouts.texture;
        self.cache
            .resolve(&TextureBinding::generate_uid(&image_tag), || {
                let pixels = rgba_pixels(&image_tag, data)?;
                Ok(TextureBinding::from_rgba8(
                    device,
                    queue,
                    layout,
                    &image_tag,
                    data.width,
                    data.height,
                    &pixels,
                ))
            })
    }
}

/// Zips the attribute streams into interleaved vertices. All present
/// streams must agree on length.
fn build_vertices(
    mesh: &str,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: Option<&[[f32; 2]]>,
) -> Result<Vec<Vertex>, GfxError> {
    if positions.len() != normals.len() {
        return Err(GfxError::AttributeMismatch {
            mesh: mesh.to_owned(),
            detail: format!(
                "{} positions but {} normals",
                positions.len(),
                normals.len()
            ),
        });
    }
    if let Some(tex) = tex_coords {
        if tex.len() != positions.len() {
            return Err(GfxError::AttributeMismatch {
                mesh: mesh.to_owned(),
                detail: format!(
                    "{} positions but {} tex coords",
                    positions.len(),
                    tex.len()
                ),
            });
        }
    }

    Ok(positions
        .iter()
        .zip(normals)
        .enumerate()
        .map(|(i, (&position, &normal))| Vertex {
            position,
            normal,
            tex_coords: tex_coords.map(|t| t[i]).unwrap_or([0.0, 0.0]),
        })
        .collect())
}

/// Expands a decoded glTF image to tightly packed RGBA8.
fn rgba_pixels(tag: &str, data: &gltf::image::Data) -> Result<Vec<u8>, GfxError> {
    use gltf::image::Format;
    match data.format {
        Format::R8G8B8A8 => Ok(data.pixels.clone()),
        Format::R8G8B8 => {
            let mut out = Vec::with_capacity(data.pixels.len() / 3 * 4);
            for px in data.pixels.chunks_exact(3) {
                out.extend_from_slice(px);
                out.push(0xff);
            }
            Ok(out)
        }
        format => Err(GfxError::UnsupportedTextureFormat {
            name: tag.to_owned(),
            format,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    // root with two translated children, one single-primitive mesh each
    const TWO_CHILD_SCENE: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"name": "root", "children": [1, 2]},
            {"name": "left", "mesh": 0, "translation": [-2.0, 0.0, 0.0]},
            {"name": "right", "mesh": 1, "translation": [2.0, 0.0, 0.0]}
        ],
        "meshes": [
            {"name": "a", "primitives": [{"attributes": {"POSITION": 0}}]},
            {"name": "b", "primitives": [{"attributes": {"POSITION": 0}}]}
        ],
        "accessors": [{
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [0.0, 0.0, 0.0]
        }]
    }"#;

    fn two_child_arena() -> (Vec<Node>, Vec<NodeId>, usize) {
        // the fixture's accessor has no bufferView (zero-filled per spec),
        // which strict validation rejects; the mesh builder is stubbed anyway
        let gltf = gltf::Gltf::from_slice_without_validation(TWO_CHILD_SCENE.as_bytes()).unwrap();
        let scene = gltf.document.default_scene().unwrap();
        let mut built = 0;
        let (nodes, roots) = build_arena(&scene, &mut |_, mesh, _, _| {
            built += 1;
            Ok(mesh.index())
        })
        .unwrap();
        (nodes, roots, built)
    }

    #[test]
    fn arena_mirrors_the_document_structure() {
        let (nodes, roots, built) = two_child_arena();
        assert_eq!(built, 2);
        assert_eq!(nodes.len(), 3);
        assert_eq!(roots.len(), 1);

        let root = &nodes[roots[0]];
        assert_eq!(root.name, "root");
        assert!(root.meshes.is_empty());
        assert_eq!(root.children.len(), 2);

        let left = &nodes[root.children[0]];
        let right = &nodes[root.children[1]];
        assert_eq!(left.name, "left");
        assert_eq!(left.meshes, vec![0]);
        assert_eq!(right.name, "right");
        assert_eq!(right.meshes, vec![1]);
        assert_eq!(left.transform.w_axis, Vec4::new(-2.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn loaded_arena_yields_one_transformed_submission_per_child_mesh() {
        let (nodes, roots, _) = two_child_arena();
        let model = Model {
            meshes: vec![
                Mesh {
                    name: "a.0".into(),
                    drawable: Drawable::new(),
                },
                Mesh {
                    name: "b.0".into(),
                    drawable: Drawable::new(),
                },
            ],
            nodes,
            roots,
        };

        let base = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let mut seen = Vec::new();
        model.visit_meshes(base, |mesh, world| seen.push((mesh, world)));

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 0);
        assert_eq!(seen[1].0, 1);
        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((seen[0].1 * origin).abs_diff_eq(Vec4::new(-2.0, 3.0, 0.0, 1.0), 1e-5));
        assert!((seen[1].1 * origin).abs_diff_eq(Vec4::new(2.0, 3.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn vertices_interleave_all_streams() {
        let verts = build_vertices(
            "m",
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            &[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            Some(&[[0.0, 0.0], [1.0, 1.0]]),
        )
        .unwrap();
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(verts[1].tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn missing_tex_coords_default_to_zero() {
        let verts = build_vertices("m", &[[0.0; 3]], &[[0.0, 1.0, 0.0]], None).unwrap();
        assert_eq!(verts[0].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn stream_length_mismatch_is_rejected() {
        let err = build_vertices("m", &[[0.0; 3]; 2], &[[0.0, 1.0, 0.0]], None).unwrap_err();
        assert!(matches!(err, GfxError::AttributeMismatch { .. }));
    }

    #[test]
    fn rgb_images_gain_an_opaque_alpha_channel() {
        let data = gltf::image::Data {
            pixels: vec![1, 2, 3, 4, 5, 6],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        assert_eq!(
            rgba_pixels("t", &data).unwrap(),
            vec![1, 2, 3, 0xff, 4, 5, 6, 0xff]
        );
    }

    #[test]
    fn exotic_formats_are_rejected() {
        let data = gltf::image::Data {
            pixels: vec![0, 0],
            format: gltf::image::Format::R16,
            width: 1,
            height: 1,
        };
        assert!(matches!(
            rgba_pixels("t", &data),
            Err(GfxError::UnsupportedTextureFormat { .. })
        ));
    }
}
