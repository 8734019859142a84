//! Demo scene: a field of spinning primitives orbiting the origin, a
//! wandering point light, an optional glTF model and a ground plane.

use std::path::Path;
use std::sync::Arc;

use glam::{EulerRot, Mat4, Vec3};

use crate::bindable::buffer::{IndexBuffer, VertexBuffer};
use crate::bindable::pipeline::PipelineState;
use crate::bindable::shader::ShaderModule;
use crate::bindable::texture::TextureBinding;
use crate::bindable::transform::TransformUniform;
use crate::bindable::uniform::{LightData, LightUniform, MaterialData, MaterialUniform};
use crate::bindable::SharedBindable;
use crate::drawable::geometry::{self, MeshData};
use crate::drawable::registry::{BindingRegistry, GeometryKind, StaticBindings};
use crate::drawable::Drawable;
use crate::gfx::{BindContext, DrawError, GfxError, WgpuContext};
use crate::model::{loader, Model};
use crate::renderer::Renderer;

const PALETTE: [[f32; 4]; 6] = [
    [0.9, 0.3, 0.25, 1.0],
    [0.3, 0.75, 0.4, 1.0],
    [0.25, 0.45, 0.9, 1.0],
    [0.9, 0.8, 0.3, 1.0],
    [0.7, 0.35, 0.85, 1.0],
    [0.35, 0.8, 0.8, 1.0],
];

const GOLDEN_ANGLE: f32 = 2.399_963;

// one tessellation for both the shaded spheres and the light marker, so
// identity-based resolution lands on the same cached buffers
const SPHERE_RINGS: u32 = 12;
const SPHERE_SECTORS: u32 = 24;

const FLOOR_TEXTURE_TAG: &str = "floor-checker";

/// Spin-and-orbit state: the object rotates around its own center while
/// the whole thing revolves around the world origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orbit {
    pub r: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub theta: f32,
    pub phi: f32,
    pub chi: f32,
    pub d_roll: f32,
    pub d_pitch: f32,
    pub d_yaw: f32,
    pub d_theta: f32,
    pub d_phi: f32,
    pub d_chi: f32,
}

impl Orbit {
    pub fn advance(&mut self, dt: f32) {
        self.roll += self.d_roll * dt;
        self.pitch += self.d_pitch * dt;
        self.yaw += self.d_yaw * dt;
        self.theta += self.d_theta * dt;
        self.phi += self.d_phi * dt;
        self.chi += self.d_chi * dt;
    }

    /// Local spin, then a push out to radius `r`, then the orbit rotation.
    pub fn world(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::YXZ, self.phi, self.theta, self.chi)
            * Mat4::from_translation(Vec3::new(self.r, 0.0, 0.0))
            * Mat4::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }
}

pub struct SceneObject {
    drawable: Drawable,
    material: Arc<MaterialUniform>,
    orbit: Orbit,
    /// Applied before everything else; scales and shapes the base geometry.
    local: Mat4,
    /// Applied last; lifts static objects away from the orbit center.
    offset: Vec3,
}

impl SceneObject {
    pub fn world(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * self.orbit.world() * self.local
    }

    pub fn material(&self) -> &MaterialUniform {
        &self.material
    }

    pub fn update(&mut self, dt: f32) {
        self.orbit.advance(dt);
    }

    pub fn draw(&self, ctx: &mut BindContext<'_, '_>) -> Result<(), DrawError> {
        self.drawable.draw(ctx, self.world())
    }
}

/// The light source and its visible emissive marker.
pub struct PointLight {
    marker: Drawable,
    pub uniform: Arc<LightUniform>,
    angle: f32,
    speed: f32,
    radius: f32,
    height: f32,
}

impl PointLight {
    pub fn position(&self) -> Vec3 {
        let (sin, cos) = self.angle.sin_cos();
        Vec3::new(self.radius * cos, self.height, self.radius * sin)
    }

    pub fn update(&mut self, dt: f32) {
        self.angle += self.speed * dt;
        self.uniform.set_position(self.position());
    }

    pub fn draw(&self, ctx: &mut BindContext<'_, '_>) -> Result<(), DrawError> {
        let world = Mat4::from_translation(self.position()) * Mat4::from_scale(Vec3::splat(0.5));
        self.marker.draw(ctx, world)
    }
}

pub struct Scene {
    pub registry: BindingRegistry,
    objects: Vec<SceneObject>,
    models: Vec<(Model, Mat4)>,
    light: PointLight,
}

impl Scene {
    /// Builds the demo scene. Static geometry bindings are created once per
    /// kind and shared by every instance through the registry; transform and
    /// material uniforms are per-instance.
    pub fn demo(
        ctx: &WgpuContext,
        renderer: &mut Renderer,
        model_path: Option<&Path>,
        object_count: usize,
    ) -> Result<Self, GfxError> {
        let layouts = &renderer.layouts;
        let cache = &mut renderer.cache;
        let device = &ctx.device;
        let format = ctx.surface_config.format;

        let light_uniform = Arc::new(LightUniform::new(
            device,
            &layouts.light,
            "scene",
            LightData::default(),
        ));

        let phong_shader = cache.resolve(&ShaderModule::generate_uid("phong"), || {
            ShaderModule::new(device, "phong")
        })?;
        let topology = wgpu::PrimitiveTopology::TriangleList;
        let phong_pipeline = cache.resolve(
            &PipelineState::generate_uid(phong_shader.name(), topology),
            || {
                Ok(PipelineState::new(
                    device,
                    format,
                    &phong_shader,
                    &[&layouts.transform, &layouts.material, &layouts.light],
                    topology,
                ))
            },
        )?;

        let mut registry = BindingRegistry::new();
        for (kind, data) in [
            (GeometryKind::Cube, geometry::cube()),
            (GeometryKind::Plane, geometry::plane()),
            (GeometryKind::Cylinder, geometry::cylinder(24)),
            (
                GeometryKind::Sphere,
                geometry::uv_sphere(SPHERE_RINGS, SPHERE_SECTORS),
            ),
        ] {
            let bindings = static_bindings(
                ctx,
                cache,
                kind,
                &data,
                phong_pipeline.clone(),
                light_uniform.clone(),
            )?;
            registry.register(kind, bindings);
        }

        let mut objects = Vec::with_capacity(object_count + 1);
        objects.push(floor(ctx, renderer, &light_uniform)?);
        for i in 0..object_count {
            objects.push(spawn(ctx, renderer, &registry, i)?);
        }

        let mut models = Vec::new();
        if let Some(path) = model_path {
            let model = loader::load_gltf(
                ctx,
                &mut renderer.cache,
                &renderer.layouts,
                &light_uniform,
                path,
            )?;
            models.push((model, Mat4::IDENTITY));
        }

        let light = point_light(ctx, renderer, light_uniform)?;

        log::info!(
            "demo scene ready: {} objects, {} models, {} cached bindables",
            objects.len(),
            models.len(),
            renderer.cache.len()
        );

        Ok(Self {
            registry,
            objects,
            models,
            light,
        })
    }

    pub fn update(&mut self, dt: f32) {
        for object in &mut self.objects {
            object.update(dt);
        }
        self.light.update(dt);
    }

    /// Uploads the frame's light state, then submits everything. The light
    /// buffer is written once per frame; per-draw uniforms are written by
    /// their bindables as the pass is recorded.
    pub fn draw(&self, ctx: &mut BindContext<'_, '_>) -> Result<(), DrawError> {
        self.light.uniform.upload(ctx.queue, ctx.frame.camera_pos);
        for object in &self.objects {
            object.draw(ctx)?;
        }
        for (model, base) in &self.models {
            model.draw(ctx, *base)?;
        }
        self.light.draw(ctx)
    }

    pub fn light(&self) -> &PointLight {
        &self.light
    }
}

fn static_bindings(
    ctx: &WgpuContext,
    cache: &mut crate::bindable::cache::BindableCache,
    kind: GeometryKind,
    data: &MeshData,
    pipeline: Arc<PipelineState>,
    light: Arc<LightUniform>,
) -> Result<StaticBindings, GfxError> {
    let device = &ctx.device;
    let tag = kind.tag();
    let vertex_buffer = cache.resolve(&VertexBuffer::generate_uid(tag), || {
        Ok(VertexBuffer::new(device, tag, &data.vertices))
    })?;
    let index_buffer = cache.resolve(&IndexBuffer::generate_uid(tag, &data.indices), || {
        Ok(IndexBuffer::new(device, tag, &data.indices))
    })?;
    Ok(StaticBindings {
        binds: vec![
            pipeline as SharedBindable,
            vertex_buffer as SharedBindable,
            light as SharedBindable,
        ],
        index: crate::drawable::IndexBinding::new(index_buffer),
    })
}

fn instance(
    ctx: &WgpuContext,
    renderer: &Renderer,
    registry: &BindingRegistry,
    kind: GeometryKind,
    tag: &str,
    material_data: MaterialData,
) -> Result<(Drawable, Arc<MaterialUniform>), GfxError> {
    let mut drawable = registry
        .instantiate(kind)
        .unwrap_or_else(|| panic!("geometry kind {kind:?} not registered"));
    let transform = TransformUniform::new(&ctx.device, &renderer.layouts.transform, tag);
    let material = Arc::new(MaterialUniform::new(
        &ctx.device,
        &renderer.layouts.material,
        tag,
        material_data,
    ));
    drawable.add_bind(Arc::new(transform) as SharedBindable);
    drawable.add_bind(material.clone() as SharedBindable);
    Ok((drawable, material))
}

/// Procedural checkerboard for the floor, `cells` squares per side.
fn checker_image(size: u32, cells: u32) -> image::DynamicImage {
    let cell = (size / cells).max(1);
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([150, 150, 158, 255])
        } else {
            image::Rgba([70, 70, 78, 255])
        }
    }))
}

/// The ground plane draws textured: same lighting as the primitives with
/// the checker albedo sampled on top.
fn floor(
    ctx: &WgpuContext,
    renderer: &mut Renderer,
    light: &Arc<LightUniform>,
) -> Result<SceneObject, GfxError> {
    let device = &ctx.device;
    let queue = &ctx.queue;
    let format = ctx.surface_config.format;
    let layouts = &renderer.layouts;
    let cache = &mut renderer.cache;

    let shader = cache.resolve(&ShaderModule::generate_uid("phong_textured"), || {
        ShaderModule::new(device, "phong_textured")
    })?;
    let topology = wgpu::PrimitiveTopology::TriangleList;
    let pipeline = cache.resolve(&PipelineState::generate_uid(shader.name(), topology), || {
        Ok(PipelineState::new(
            device,
            format,
            &shader,
            &[
                &layouts.transform,
                &layouts.material,
                &layouts.light,
                &layouts.texture,
            ],
            topology,
        ))
    })?;
    let texture = cache.resolve(&TextureBinding::generate_uid(FLOOR_TEXTURE_TAG), || {
        Ok(TextureBinding::from_image(
            device,
            queue,
            &layouts.texture,
            FLOOR_TEXTURE_TAG,
            &checker_image(512, 32),
        ))
    })?;

    // plane buffers resolve to the instances registered during setup
    let plane = geometry::plane();
    let tag = GeometryKind::Plane.tag();
    let vertex_buffer = cache.resolve(&VertexBuffer::generate_uid(tag), || {
        Ok(VertexBuffer::new(device, tag, &plane.vertices))
    })?;
    let index_buffer = cache.resolve(&IndexBuffer::generate_uid(tag, &plane.indices), || {
        Ok(IndexBuffer::new(device, tag, &plane.indices))
    })?;

    let mut drawable = Drawable::new();
    drawable.add_bind(pipeline as SharedBindable);
    drawable.add_bind(vertex_buffer as SharedBindable);
    drawable.add_bind(light.clone() as SharedBindable);
    drawable.add_bind(texture as SharedBindable);
    let transform = TransformUniform::new(device, &layouts.transform, "floor");
    drawable.add_bind(Arc::new(transform) as SharedBindable);
    let material = Arc::new(MaterialUniform::new(
        device,
        &layouts.material,
        "floor",
        MaterialData {
            color: [1.0, 1.0, 1.0, 1.0],
            specular_intensity: 0.2,
            ..MaterialData::default()
        },
    ));
    drawable.add_bind(material.clone() as SharedBindable);
    drawable.set_index_buffer(index_buffer);

    Ok(SceneObject {
        drawable,
        material,
        orbit: Orbit::default(),
        local: Mat4::from_scale(Vec3::new(60.0, 1.0, 60.0)),
        offset: Vec3::new(0.0, -8.0, 0.0),
    })
}

/// Deterministic parameter spread: every index maps to a fixed kind,
/// radius, color and set of spin rates.
fn spawn(
    ctx: &WgpuContext,
    renderer: &Renderer,
    registry: &BindingRegistry,
    i: usize,
) -> Result<SceneObject, GfxError> {
    let kind = match i % 3 {
        0 => GeometryKind::Cube,
        1 => GeometryKind::Cylinder,
        _ => GeometryKind::Sphere,
    };
    let fi = i as f32;
    let (drawable, material) = instance(
        ctx,
        renderer,
        registry,
        kind,
        &format!("object{i}"),
        MaterialData {
            color: PALETTE[i % PALETTE.len()],
            ..MaterialData::default()
        },
    )?;
    Ok(SceneObject {
        drawable,
        material,
        orbit: Orbit {
            r: 6.0 + (i % 5) as f32 * 1.8,
            theta: fi * 0.53,
            phi: fi * GOLDEN_ANGLE,
            chi: fi * 0.31,
            d_roll: 0.6 + 0.09 * (i % 7) as f32,
            d_pitch: 0.8 + 0.07 * (i % 5) as f32,
            d_yaw: 0.7 + 0.11 * (i % 3) as f32,
            d_theta: 0.15 + 0.03 * (i % 4) as f32,
            d_phi: 0.25 + 0.02 * (i % 6) as f32,
            d_chi: 0.1 + 0.04 * (i % 2) as f32,
            ..Orbit::default()
        },
        local: Mat4::IDENTITY,
        offset: Vec3::ZERO,
    })
}

fn point_light(
    ctx: &WgpuContext,
    renderer: &mut Renderer,
    uniform: Arc<LightUniform>,
) -> Result<PointLight, GfxError> {
    let device = &ctx.device;
    let format = ctx.surface_config.format;
    let layouts = &renderer.layouts;
    let cache = &mut renderer.cache;

    let shader = cache.resolve(&ShaderModule::generate_uid("emissive"), || {
        ShaderModule::new(device, "emissive")
    })?;
    let topology = wgpu::PrimitiveTopology::TriangleList;
    let pipeline = cache.resolve(&PipelineState::generate_uid(shader.name(), topology), || {
        Ok(PipelineState::new(
            device,
            format,
            &shader,
            &[&layouts.transform, &layouts.material],
            topology,
        ))
    })?;

    // the marker reuses the sphere buffers but not the phong bind list;
    // resolve them by identity rather than by position in the static list
    let sphere = geometry::uv_sphere(SPHERE_RINGS, SPHERE_SECTORS);
    let tag = GeometryKind::Sphere.tag();
    let vertex_buffer = cache.resolve(&VertexBuffer::generate_uid(tag), || {
        Ok(VertexBuffer::new(device, tag, &sphere.vertices))
    })?;
    let index_buffer = cache.resolve(&IndexBuffer::generate_uid(tag, &sphere.indices), || {
        Ok(IndexBuffer::new(device, tag, &sphere.indices))
    })?;
    let mut marker = Drawable::new();
    marker.add_bind(pipeline as SharedBindable);
    marker.add_bind(vertex_buffer as SharedBindable);
    marker.set_index_buffer(index_buffer);
    let transform = TransformUniform::new(device, &layouts.transform, "light-marker");
    marker.add_bind(Arc::new(transform) as SharedBindable);
    let glow = MaterialUniform::new(
        device,
        &layouts.material,
        "light-marker",
        MaterialData {
            color: [1.0, 1.0, 0.9, 1.0],
            ..MaterialData::default()
        },
    );
    marker.add_bind(Arc::new(glow) as SharedBindable);

    Ok(PointLight {
        marker,
        uniform,
        angle: 0.0,
        speed: 0.5,
        radius: 9.0,
        height: 6.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindable::cache::BindableCache;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn checker_image_alternates_cells() {
        let img = checker_image(64, 8).to_rgba8();
        assert_eq!(img.dimensions(), (64, 64));
        let a = img.get_pixel(0, 0);
        let b = img.get_pixel(8, 0);
        let c = img.get_pixel(8, 8);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn light_marker_resolves_the_registered_sphere_buffers() {
        // the marker re-resolves by identity, so it must land on the exact
        // instances setup registered, without running its creation closures
        struct Buf;
        let mut cache = BindableCache::new();
        let sphere = geometry::uv_sphere(SPHERE_RINGS, SPHERE_SECTORS);
        let tag = GeometryKind::Sphere.tag();
        let vertex_uid = VertexBuffer::generate_uid(tag);
        let index_uid = IndexBuffer::generate_uid(tag, &sphere.indices);

        let registered = cache.resolve(&vertex_uid, || Ok(Buf)).unwrap();
        let marker_vb = cache
            .resolve(&vertex_uid, || -> Result<Buf, GfxError> {
                panic!("sphere vertex buffer was not shared")
            })
            .unwrap();
        assert!(Arc::ptr_eq(&registered, &marker_vb));

        let registered = cache.resolve(&index_uid, || Ok(Buf)).unwrap();
        let marker_ib = cache
            .resolve(&index_uid, || -> Result<Buf, GfxError> {
                panic!("sphere index buffer was not shared")
            })
            .unwrap();
        assert!(Arc::ptr_eq(&registered, &marker_ib));
    }

    #[test]
    fn advance_integrates_every_rate() {
        let mut orbit = Orbit {
            d_roll: 1.0,
            d_pitch: 2.0,
            d_yaw: 3.0,
            d_theta: 4.0,
            d_phi: 5.0,
            d_chi: 6.0,
            ..Orbit::default()
        };
        orbit.advance(0.5);
        assert_eq!(orbit.roll, 0.5);
        assert_eq!(orbit.pitch, 1.0);
        assert_eq!(orbit.yaw, 1.5);
        assert_eq!(orbit.theta, 2.0);
        assert_eq!(orbit.phi, 2.5);
        assert_eq!(orbit.chi, 3.0);
    }

    #[test]
    fn zero_angles_place_the_object_on_the_x_axis() {
        let orbit = Orbit {
            r: 5.0,
            ..Orbit::default()
        };
        let pos = orbit.world() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(pos.abs_diff_eq(Vec4::new(5.0, 0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn orbit_yaw_swings_the_object_around_the_origin() {
        let orbit = Orbit {
            r: 5.0,
            phi: FRAC_PI_2,
            ..Orbit::default()
        };
        let pos = orbit.world() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(pos.abs_diff_eq(Vec4::new(0.0, 0.0, -5.0, 1.0), 1e-4));
    }

    #[test]
    fn local_spin_leaves_the_position_unchanged() {
        let still = Orbit {
            r: 5.0,
            theta: 0.4,
            phi: 1.1,
            ..Orbit::default()
        };
        let spinning = Orbit {
            roll: 0.7,
            pitch: 1.9,
            yaw: 2.3,
            ..still
        };
        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let a = still.world() * origin;
        let b = spinning.world() * origin;
        assert!(a.abs_diff_eq(b, 1e-4));
    }

    #[test]
    fn orbit_lifts_off_axis_points_differently_than_the_origin() {
        // spin happens before the radial push, so a point off the object's
        // center does move under local rotation
        let still = Orbit {
            r: 5.0,
            ..Orbit::default()
        };
        let spinning = Orbit {
            yaw: FRAC_PI_2,
            ..still
        };
        let p = Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(!(still.world() * p).abs_diff_eq(spinning.world() * p, 1e-4));
    }
}
