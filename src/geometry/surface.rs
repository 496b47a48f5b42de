//! Solid platform surface geometry
//!
//! The walkable surface is a closed cross-section: the sampled top boundary
//! left to right, then the same boundary dropped by the platform thickness,
//! right to left. That polygon is triangulated, extruded along Z, and centered
//! on the X axis so the mesh origin sits at the platform's horizontal middle.

use glam::{Vec2, Vec3};

use super::mesh::MeshData;
use crate::consts::PLATFORM_THICKNESS;
use crate::sim::curve::{CurveParams, curve_height};
use crate::sim::path::{PathResolution, SampledPath, floor_length, sample_path};

/// Surface height query bound to one platform's curve parameters.
///
/// Takes x in the platform's local frame (origin at the horizontal middle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightFn {
    params: CurveParams,
}

impl HeightFn {
    pub fn new(length: f32, curviness: f32) -> Self {
        Self {
            params: CurveParams::new(length, curviness),
        }
    }

    /// Surface height at local `x`
    #[inline]
    pub fn at(&self, local_x: f32) -> f32 {
        curve_height(
            local_x + self.params.length / 2.0,
            self.params.length,
            self.params.curviness,
        )
    }

    pub fn params(&self) -> CurveParams {
        self.params
    }

    pub fn half_length(&self) -> f32 {
        self.params.length / 2.0
    }

    /// Whether local `x` lies over the platform
    pub fn spans(&self, local_x: f32) -> bool {
        local_x >= -self.half_length() && local_x <= self.half_length()
    }
}

/// Extruded platform mesh plus its height query
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub mesh: MeshData,
    /// Top boundary in local coordinates, left to right
    pub top_outline: Vec<Vec2>,
    pub width: f32,
    pub height: HeightFn,
}

impl SurfaceMesh {
    pub fn length(&self) -> f32 {
        self.height.params().length
    }

    pub fn height_at(&self, local_x: f32) -> f32 {
        self.height.at(local_x)
    }
}

/// Closed cross-section: top boundary forward, lowered boundary backward
pub fn cross_section(path: &SampledPath, thickness: f32) -> Vec<Vec2> {
    let top = path.iter().map(|s| s.position());
    let bottom = path
        .iter()
        .rev()
        .map(|s| Vec2::new(s.x, s.y - thickness));
    top.chain(bottom).collect()
}

/// Triangulate a cross-section built by [`cross_section`].
///
/// Ring index `i` on the top pairs with `ring_len - 1 - i` on the bottom,
/// so each segment becomes one quad. Triangles wind counter-clockwise.
pub fn triangulate_cross_section(ring_len: usize) -> Vec<[u32; 3]> {
    let columns = ring_len / 2;
    let mut triangles = Vec::with_capacity(columns.saturating_sub(1) * 2);
    for i in 0..columns.saturating_sub(1) {
        let top_a = i as u32;
        let top_b = (i + 1) as u32;
        let bottom_a = (ring_len - 1 - i) as u32;
        let bottom_b = (ring_len - 2 - i) as u32;
        triangles.push([bottom_a, bottom_b, top_b]);
        triangles.push([bottom_a, top_b, top_a]);
    }
    triangles
}

/// Build the walkable surface for a platform.
///
/// Front face at `+width/2`, back face at `-width/2`, walls around the whole
/// cross-section perimeter (top strip, underside, end caps).
pub fn build_platform_surface(length: f32, width: f32, curviness: f32) -> SurfaceMesh {
    build_platform_surface_with(length, width, curviness, PathResolution::SURFACE)
}

pub fn build_platform_surface_with(
    length: f32,
    width: f32,
    curviness: f32,
    resolution: PathResolution,
) -> SurfaceMesh {
    let length = floor_length(length);
    let path = sample_path(length, curviness, resolution);
    let half_length = length / 2.0;
    let half_width = width.max(0.0) / 2.0;

    let ring: Vec<Vec2> = cross_section(&path, PLATFORM_THICKNESS)
        .into_iter()
        .map(|p| Vec2::new(p.x - half_length, p.y))
        .collect();
    let triangles = triangulate_cross_section(ring.len());

    let ring_len = ring.len();
    let mut mesh = MeshData::with_capacity(ring_len * 4, triangles.len() * 6 + ring_len * 6);
    let face_uv = |p: Vec2, on_top: bool| {
        Vec2::new((p.x + half_length) / length, if on_top { 1.0 } else { 0.0 })
    };
    let columns = ring_len / 2;

    // Front face
    let front_base = mesh.vertex_count() as u32;
    for (i, p) in ring.iter().enumerate() {
        mesh.push_vertex(p.extend(half_width), face_uv(*p, i < columns));
    }
    for [a, b, c] in &triangles {
        mesh.push_triangle(front_base + a, front_base + b, front_base + c);
    }

    // Back face, mirrored winding
    let back_base = mesh.vertex_count() as u32;
    for (i, p) in ring.iter().enumerate() {
        mesh.push_vertex(p.extend(-half_width), face_uv(*p, i < columns));
    }
    for [a, b, c] in &triangles {
        mesh.push_triangle(back_base + a, back_base + c, back_base + b);
    }

    // Walls: one quad per perimeter edge, u running around the perimeter
    let perimeter: f32 = (0..ring_len)
        .map(|i| ring[i].distance(ring[(i + 1) % ring_len]))
        .sum::<f32>()
        .max(f32::EPSILON);
    let mut travelled = 0.0;
    for i in 0..ring_len {
        let a = ring[i];
        let b = ring[(i + 1) % ring_len];
        let u0 = travelled / perimeter;
        travelled += a.distance(b);
        let u1 = travelled / perimeter;

        let fa = mesh.push_vertex(a.extend(half_width), Vec2::new(u0, 0.0));
        let ba = mesh.push_vertex(a.extend(-half_width), Vec2::new(u0, 1.0));
        let bb = mesh.push_vertex(b.extend(-half_width), Vec2::new(u1, 1.0));
        let fb = mesh.push_vertex(b.extend(half_width), Vec2::new(u1, 0.0));
        mesh.push_quad(fa, ba, bb, fb);
    }

    SurfaceMesh {
        mesh,
        top_outline: ring[..columns].to_vec(),
        width: half_width * 2.0,
        height: HeightFn::new(length, curviness),
    }
}

/// Local-space offset that lifts a point onto the front face
pub fn front_face_offset(width: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, width.max(0.0) / 2.0)
}
