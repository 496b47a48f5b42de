//! Plain mesh buffers handed to the render engine

use glam::{Vec2, Vec3};

/// Vertex positions, texture coordinates and triangle indices.
///
/// Owned buffers with value semantics: cloning copies every vertex, so two
/// platforms never share geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Axis-aligned square in the XY plane centered on the origin
    pub fn quad(half_extent: f32) -> Self {
        let mut mesh = Self::with_capacity(4, 6);
        let h = half_extent;
        let a = mesh.push_vertex(Vec3::new(-h, -h, 0.0), Vec2::new(0.0, 0.0));
        let b = mesh.push_vertex(Vec3::new(h, -h, 0.0), Vec2::new(1.0, 0.0));
        let c = mesh.push_vertex(Vec3::new(h, h, 0.0), Vec2::new(1.0, 1.0));
        let d = mesh.push_vertex(Vec3::new(-h, h, 0.0), Vec2::new(0.0, 1.0));
        mesh.push_quad(a, b, c, d);
        mesh
    }

    /// Append a vertex, returning its index
    pub fn push_vertex(&mut self, position: Vec3, uv: Vec2) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.uvs.push(uv.to_array());
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Two triangles covering the quad `a b c d` (counter-clockwise)
    pub fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Shift every vertex by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            p[0] += offset.x;
            p[1] += offset.y;
            p[2] += offset.z;
        }
    }

    /// Axis-aligned bounds as (min, max); `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = Vec3::from_array(*self.positions.first()?);
        Some(self.positions.iter().fold((first, first), |(lo, hi), p| {
            let p = Vec3::from_array(*p);
            (lo.min(p), hi.max(p))
        }))
    }

    /// All indices reference existing vertices and form whole triangles
    pub fn is_well_formed(&self) -> bool {
        self.indices.len() % 3 == 0
            && self.positions.len() == self.uvs.len()
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.positions.len())
            && self
                .positions
                .iter()
                .all(|p| p.iter().all(|c| c.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_and_bounds() {
        let mut mesh = MeshData::default();
        let a = mesh.push_vertex(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0));
        let b = mesh.push_vertex(Vec3::new(1.0, 0.0, 0.0), Vec2::new(1.0, 0.0));
        let c = mesh.push_vertex(Vec3::new(1.0, 1.0, 0.0), Vec2::new(1.0, 1.0));
        let d = mesh.push_vertex(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 1.0));
        mesh.push_quad(a, b, c, d);

        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.is_well_formed());
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))));

        mesh.translate(Vec3::new(-0.5, 2.0, 0.0));
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-0.5, 2.0, 0.0));
        assert_eq!(hi, Vec3::new(0.5, 3.0, 0.0));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut mesh = MeshData::default();
        mesh.push_vertex(Vec3::ONE, Vec2::ZERO);
        let mut copy = mesh.clone();
        copy.translate(Vec3::X);
        assert_eq!(mesh.positions[0], [1.0, 1.0, 1.0]);
        assert_eq!(copy.positions[0], [2.0, 1.0, 1.0]);
    }
}
