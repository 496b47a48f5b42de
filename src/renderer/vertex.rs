//! Vertex types for mesh rendering

use bytemuck::{Pod, Zeroable};

use crate::geometry::MeshData;

/// Interleaved vertex with position and texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
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

/// Zip a mesh's separate position and UV arrays into one vertex stream
pub fn interleave(mesh: &MeshData) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.uvs)
        .map(|(p, uv)| MeshVertex::new(*p, *uv))
        .collect()
}

/// Colors for game elements
pub mod colors {
    pub const PLATFORM: [f32; 4] = [0.25, 0.55, 0.85, 1.0];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PLAYER: [f32; 4] = [1.0, 0.45, 0.35, 1.0];
    /// Clear color behind the level
    pub const SKY: [f64; 4] = [0.04, 0.05, 0.12, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_text_ribbon;

    #[test]
    fn test_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 20);
        let desc = MeshVertex::desc();
        assert_eq!(desc.array_stride, 20);
        assert_eq!(desc.attributes[1].offset, 12);
    }

    #[test]
    fn test_interleave_keeps_order() {
        let ribbon = build_text_ribbon("a curved line of text", 10.0, 4.0);
        let vertices = interleave(&ribbon.mesh);
        assert_eq!(vertices.len(), ribbon.mesh.vertex_count());
        assert_eq!(vertices[3].position, ribbon.mesh.positions[3]);
        assert_eq!(vertices[3].uv, ribbon.mesh.uvs[3]);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), vertices.len() * 20);
    }
}
