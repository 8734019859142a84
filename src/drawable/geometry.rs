//! Procedural primitive generators. All primitives are unit-sized,
//! centered on the origin, wound counter-clockwise for back-face culling.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::bindable::vertex::Vertex;

/// CPU-side geometry handed to the vertex/index buffer bindables.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Axis-aligned unit cube with per-face normals (24 vertices, 36 indices).
pub fn cube() -> MeshData {
    // (normal, right, up) with right x up == normal, so each face winds CCW
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut data = MeshData::default();
    for (normal, right, up) in FACES {
        let base = data.vertices.len() as u32;
        let center = normal * 0.5;
        let corners = [
            (center - right * 0.5 - up * 0.5, [0.0, 1.0]),
            (center + right * 0.5 - up * 0.5, [1.0, 1.0]),
            (center + right * 0.5 + up * 0.5, [1.0, 0.0]),
            (center - right * 0.5 + up * 0.5, [0.0, 0.0]),
        ];
        for (pos, uv) in corners {
            data.vertices.push(Vertex {
                position: pos.into(),
                normal: normal.into(),
                tex_coords: uv,
            });
        }
        data.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// Unit quad in the XZ plane facing +Y.
pub fn plane() -> MeshData {
    let normal = [0.0, 1.0, 0.0];
    MeshData {
        vertices: vec![
            Vertex {
                position: [-0.5, 0.0, -0.5],
                normal,
                tex_coords: [0.0, 0.0],
            },
            Vertex {
                position: [0.5, 0.0, -0.5],
                normal,
                tex_coords: [1.0, 0.0],
            },
            Vertex {
                position: [0.5, 0.0, 0.5],
                normal,
                tex_coords: [1.0, 1.0],
            },
            Vertex {
                position: [-0.5, 0.0, 0.5],
                normal,
                tex_coords: [0.0, 1.0],
            },
        ],
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Tessellated prism along the Y axis with smooth side normals and
/// independent cap normals. `segments` must be at least 3.
pub fn cylinder(segments: u32) -> MeshData {
    assert!(segments >= 3, "cylinder needs at least 3 segments");
    let n = segments;
    let r = 0.5f32;
    let h = 0.5f32;
    let mut data = MeshData::default();

    // side ring: bottom/top pairs with radial normals
    for i in 0..n {
        let theta = i as f32 * TAU / n as f32;
        let (sin, cos) = theta.sin_cos();
        let normal = [cos, 0.0, sin];
        let u = i as f32 / n as f32;
        data.vertices.push(Vertex {
            position: [r * cos, -h, r * sin],
            normal,
            tex_coords: [u, 1.0],
        });
        data.vertices.push(Vertex {
            position: [r * cos, h, r * sin],
            normal,
            tex_coords: [u, 0.0],
        });
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let (bi, ti) = (2 * i, 2 * i + 1);
        let (bj, tj) = (2 * j, 2 * j + 1);
        data.indices.extend([bi, ti, bj, ti, tj, bj]);
    }

    // caps: center plus an independent ring with axial normals
    for &(y, ny) in &[(h, 1.0f32), (-h, -1.0f32)] {
        let base = data.vertices.len() as u32;
        data.vertices.push(Vertex {
            position: [0.0, y, 0.0],
            normal: [0.0, ny, 0.0],
            tex_coords: [0.5, 0.5],
        });
        for i in 0..n {
            let theta = i as f32 * TAU / n as f32;
            let (sin, cos) = theta.sin_cos();
            data.vertices.push(Vertex {
                position: [r * cos, y, r * sin],
                normal: [0.0, ny, 0.0],
                tex_coords: [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
            });
        }
        for i in 0..n {
            let j = (i + 1) % n;
            if ny > 0.0 {
                data.indices.extend([base, base + 1 + j, base + 1 + i]);
            } else {
                data.indices.extend([base, base + 1 + i, base + 1 + j]);
            }
        }
    }

    data
}

/// UV sphere with `rings` latitude bands and `sectors` longitude bands.
pub fn uv_sphere(rings: u32, sectors: u32) -> MeshData {
    assert!(rings >= 2 && sectors >= 3, "sphere tessellation too coarse");
    let r = 0.5f32;
    let mut data = MeshData::default();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for s in 0..=sectors {
            let theta = TAU * s as f32 / sectors as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let dir = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            data.vertices.push(Vertex {
                position: (dir * r).into(),
                normal: dir.into(),
                tex_coords: [s as f32 / sectors as f32, ring as f32 / rings as f32],
            });
        }
    }

    let stride = sectors + 1;
    for ring in 0..rings {
        for s in 0..sectors {
            let i0 = ring * stride + s;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;
            data.indices.extend([i0, i1, i2, i1, i3, i2]);
        }
    }

    data
}
