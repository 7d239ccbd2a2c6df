// Procedural mesh types, shape builders and triangulation.
//
// Two-layer architecture:
//   shape builder → PolyMesh → triangulate_smooth() → RenderMesh → GPU
//
// Faces that should look faceted (box sides, star edges) get their own
// vertices via `add_flat_face`; shared vertices give smooth shading.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

// ============================================================================
// GPU VERTICES
// ============================================================================

/// GPU-ready vertex with position and normal.
///   @location(0) position: vec3<f32>
///   @location(1) normal:   vec3<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal:   [f32; 3],
}

impl GpuVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Textured vertex for photo planes.
///   @location(0) position: vec3<f32>
///   @location(1) uv:       vec2<f32>
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhotoVertex {
    pub position: [f32; 3],
    pub uv:       [f32; 2],
}

impl PhotoVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PhotoVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Unit photo quad in the XY plane facing +Z, half-extent 1.
/// UV origin is top-left to match image row order.
pub const PHOTO_QUAD_VERTICES: &[PhotoVertex] = &[
    PhotoVertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 1.0] },
    PhotoVertex { position: [ 1.0, -1.0, 0.0], uv: [1.0, 1.0] },
    PhotoVertex { position: [ 1.0,  1.0, 0.0], uv: [1.0, 0.0] },
    PhotoVertex { position: [-1.0,  1.0, 0.0], uv: [0.0, 0.0] },
];

pub const PHOTO_QUAD_INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

// ============================================================================
// POLY MESH
// ============================================================================

/// Intermediate polygon mesh for procedural construction.
/// Faces use CCW winding when viewed from outside (consistent with back-face culling).
/// Faces must be convex: triangulation fans from each face's first vertex.
/// NOT GPU-ready — use `RenderMesh` for rendering.
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub faces:     Vec<Vec<usize>>,  // each face = CCW-ordered vertex index list
}

impl PolyMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces:     Vec::new(),
        }
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        let idx = self.positions.len();
        self.positions.push(pos);
        idx
    }

    /// Add a face by vertex indices (CCW order).
    pub fn add_face(&mut self, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "Face must have at least 3 vertices");
        self.faces.push(indices);
    }

    /// Add a face with its own copies of the corner vertices, so it shades flat.
    pub fn add_flat_face(&mut self, corners: &[Vec3]) {
        let indices = corners.iter().map(|&p| self.add_vertex(p)).collect();
        self.add_face(indices);
    }

    pub fn vertex_count(&self) -> usize { self.positions.len() }
}

// ============================================================================
// RENDER MESH
// ============================================================================

/// GPU-ready triangulated mesh with per-vertex normals.
/// Upload vertex_bytes() to a VERTEX buffer, index_bytes() to an INDEX buffer.
pub struct RenderMesh {
    pub vertices: Vec<GpuVertex>,
    pub indices:  Vec<u32>,
}

impl RenderMesh {
    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> usize  { self.indices.len() }
}

// ============================================================================
// TRIANGULATION + SMOOTH NORMALS
// ============================================================================

/// Convert a PolyMesh to a GPU-ready RenderMesh using smooth (area-weighted) normals.
///
///   1. Accumulate area-weighted face normals into each vertex.
///      The cross product magnitude = 2×triangle_area, giving automatic area-weighting.
///   2. Normalize each accumulated normal.
///   3. Fan-triangulate each face (from vertex 0).
pub fn triangulate_smooth(poly: &PolyMesh) -> RenderMesh {
    let mut normal_accum: Vec<Vec3> = vec![Vec3::ZERO; poly.vertex_count()];

    for face in &poly.faces {
        for i in 1..(face.len() - 1) {
            let a = poly.positions[face[0]];
            let b = poly.positions[face[i]];
            let c = poly.positions[face[i + 1]];
            let weighted_normal = (b - a).cross(c - a);
            normal_accum[face[0]]     += weighted_normal;
            normal_accum[face[i]]     += weighted_normal;
            normal_accum[face[i + 1]] += weighted_normal;
        }
    }

    let vertices: Vec<GpuVertex> = poly.positions.iter()
        .zip(normal_accum.iter())
        .map(|(pos, n)| GpuVertex {
            position: pos.to_array(),
            normal:   n.normalize_or_zero().to_array(),
        })
        .collect();

    let mut indices: Vec<u32> = Vec::new();
    for face in &poly.faces {
        for i in 1..(face.len() - 1) {
            indices.push(face[0]     as u32);
            indices.push(face[i]     as u32);
            indices.push(face[i + 1] as u32);
        }
    }

    RenderMesh { vertices, indices }
}

// ============================================================================
// SHAPE BUILDERS
// ============================================================================

/// Latitude/longitude sphere of radius 1. Poles are single shared vertices.
pub fn uv_sphere(rings: usize, segments: usize) -> PolyMesh {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut mesh = PolyMesh::new();

    let top = mesh.add_vertex(Vec3::Y);
    // Interior rings 1..rings, each with `segments` vertices.
    for r in 1..rings {
        let theta = PI * r as f32 / rings as f32;
        for s in 0..segments {
            let phi = TAU * s as f32 / segments as f32;
            mesh.add_vertex(Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()));
        }
    }
    let bottom = mesh.add_vertex(-Vec3::Y);

    let ring = |r: usize, s: usize| 1 + (r - 1) * segments + (s % segments);

    for s in 0..segments {
        mesh.add_face(vec![top, ring(1, s + 1), ring(1, s)]);
    }
    for r in 1..(rings - 1) {
        for s in 0..segments {
            mesh.add_face(vec![ring(r, s), ring(r, s + 1), ring(r + 1, s + 1), ring(r + 1, s)]);
        }
    }
    for s in 0..segments {
        mesh.add_face(vec![bottom, ring(rings - 1, s), ring(rings - 1, s + 1)]);
    }
    mesh
}

/// Flat-shaded box with the given half-extents.
pub fn gift_box(half: Vec3) -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let c = |x: f32, y: f32, z: f32| Vec3::new(x * half.x, y * half.y, z * half.z);

    mesh.add_flat_face(&[c(-1.0, -1.0,  1.0), c( 1.0, -1.0,  1.0), c( 1.0,  1.0,  1.0), c(-1.0,  1.0,  1.0)]); // +Z
    mesh.add_flat_face(&[c( 1.0, -1.0, -1.0), c(-1.0, -1.0, -1.0), c(-1.0,  1.0, -1.0), c( 1.0,  1.0, -1.0)]); // -Z
    mesh.add_flat_face(&[c(-1.0, -1.0, -1.0), c(-1.0, -1.0,  1.0), c(-1.0,  1.0,  1.0), c(-1.0,  1.0, -1.0)]); // -X
    mesh.add_flat_face(&[c( 1.0, -1.0,  1.0), c( 1.0, -1.0, -1.0), c( 1.0,  1.0, -1.0), c( 1.0,  1.0,  1.0)]); // +X
    mesh.add_flat_face(&[c(-1.0,  1.0,  1.0), c( 1.0,  1.0,  1.0), c( 1.0,  1.0, -1.0), c(-1.0,  1.0, -1.0)]); // +Y
    mesh.add_flat_face(&[c(-1.0, -1.0, -1.0), c( 1.0, -1.0, -1.0), c( 1.0, -1.0,  1.0), c(-1.0, -1.0,  1.0)]); // -Y
    mesh
}

/// Five-point star in the XY plane, extruded along Z by `depth`.
/// Outer radius 1, inner radius `inner`.
pub fn extruded_star(inner: f32, depth: f32) -> PolyMesh {
    const POINTS: usize = 5;
    let outline: Vec<Vec2> = (0..POINTS * 2)
        .map(|i| {
            let angle = PI * 0.5 + PI * i as f32 / POINTS as f32;
            let radius = if i % 2 == 0 { 1.0 } else { inner };
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();

    let half = depth * 0.5;
    let mut mesh = PolyMesh::new();

    // Front cap (+Z): triangle fan around a shared centre so the concave outline is fine.
    let front_center = mesh.add_vertex(Vec3::new(0.0, 0.0, half));
    let front: Vec<usize> = outline.iter().map(|p| mesh.add_vertex(p.extend(half))).collect();
    for i in 0..outline.len() {
        let j = (i + 1) % outline.len();
        mesh.add_face(vec![front_center, front[i], front[j]]);
    }

    // Back cap (-Z): reversed winding.
    let back_center = mesh.add_vertex(Vec3::new(0.0, 0.0, -half));
    let back: Vec<usize> = outline.iter().map(|p| mesh.add_vertex(p.extend(-half))).collect();
    for i in 0..outline.len() {
        let j = (i + 1) % outline.len();
        mesh.add_face(vec![back_center, back[j], back[i]]);
    }

    // Side walls, one flat quad per outline edge.
    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[(i + 1) % outline.len()];
        mesh.add_flat_face(&[a.extend(-half), b.extend(-half), b.extend(half), a.extend(half)]);
    }
    mesh
}

/// Flat-shaded regular octahedron with vertices at distance 1 on each axis.
pub fn octahedron() -> PolyMesh {
    let mut mesh = PolyMesh::new();
    let equator = [Vec3::X, Vec3::Z, -Vec3::X, -Vec3::Z];
    for i in 0..4 {
        let a = equator[i];
        let b = equator[(i + 1) % 4];
        mesh.add_flat_face(&[Vec3::Y, b, a]);
        mesh.add_flat_face(&[-Vec3::Y, a, b]);
    }
    mesh
}
