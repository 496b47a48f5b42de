//! Curved text ribbon
//!
//! A quad strip that follows the platform path, offset along the local normal
//! so the text band bends with the curve. One texture with the whole sentence
//! stretches across it lengthwise; rasterizing that texture is up to the
//! renderer.

use glam::Vec2;

use super::mesh::MeshData;
use crate::consts::{TEXT_HEIGHT, TEXT_PIXELS_PER_UNIT};
use crate::sim::path::{PathResolution, floor_length, sample_path};

/// What the text rasterizer needs to produce the ribbon texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTextureRequest {
    pub text: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl TextTextureRequest {
    pub fn for_ribbon(text: &str, length: f32) -> Self {
        let width_px = (floor_length(length) * TEXT_PIXELS_PER_UNIT).round() as u32;
        let height_px = (TEXT_HEIGHT * TEXT_PIXELS_PER_UNIT).round() as u32;
        Self {
            text: text.to_owned(),
            width_px: width_px.max(1),
            height_px: height_px.max(1),
        }
    }
}

/// Text band mesh plus the texture it expects
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonMesh {
    pub mesh: MeshData,
    pub texture: TextTextureRequest,
}

/// Build the strip geometry alone (text independent, cacheable)
pub fn build_ribbon_mesh(length: f32, curviness: f32, resolution: PathResolution) -> MeshData {
    let length = floor_length(length);
    let path = sample_path(length, curviness, resolution);
    let half_length = length / 2.0;
    let half_height = TEXT_HEIGHT / 2.0;
    let segments = path.segment_count().max(1) as f32;

    let mut mesh = MeshData::with_capacity(path.samples.len() * 2, path.segment_count() * 6);
    for (i, sample) in path.iter().enumerate() {
        let center = Vec2::new(sample.x - half_length, sample.y);
        let top = center + sample.normal * half_height;
        let bottom = center - sample.normal * half_height;
        let u = i as f32 / segments;
        mesh.push_vertex(top.extend(0.0), Vec2::new(u, 1.0));
        mesh.push_vertex(bottom.extend(0.0), Vec2::new(u, 0.0));
    }

    for i in 0..path.segment_count() as u32 {
        let top_a = i * 2;
        let bottom_a = top_a + 1;
        let top_b = top_a + 2;
        let bottom_b = top_a + 3;
        mesh.push_quad(bottom_a, bottom_b, top_b, top_a);
    }

    mesh
}

/// Build a text ribbon for `text` along a platform of `length` and `curviness`
pub fn build_text_ribbon(text: &str, length: f32, curviness: f32) -> RibbonMesh {
    RibbonMesh {
        mesh: build_ribbon_mesh(length, curviness, PathResolution::RIBBON),
        texture: TextTextureRequest::for_ribbon(text, length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::curve::curve_height;
    use crate::sim::path::tangent_frame;

    #[test]
    fn test_strip_layout() {
        let ribbon = build_text_ribbon("Each sentence will become a platform.", 18.0, 5.0);
        let segments = PathResolution::RIBBON.segment_count(18.0);
        assert_eq!(ribbon.mesh.vertex_count(), (segments + 1) * 2);
        assert_eq!(ribbon.mesh.triangle_count(), segments * 2);
        assert!(ribbon.mesh.is_well_formed());
    }

    #[test]
    fn test_offset_follows_normal() {
        let length = 16.0;
        let curviness = 10.0;
        let mesh = build_ribbon_mesh(length, curviness, PathResolution::RIBBON);
        let segments = PathResolution::RIBBON.segment_count(length);
        for i in 0..=segments {
            let top = Vec2::from_slice(&mesh.positions[i * 2][..2]);
            let bottom = Vec2::from_slice(&mesh.positions[i * 2 + 1][..2]);
            let x = length * i as f32 / segments as f32;
            let (_, normal) = tangent_frame(x, length, curviness);

            assert!(((top - bottom).length() - TEXT_HEIGHT).abs() < 1e-4);
            assert!((top - bottom).normalize().dot(normal) > 0.9999);
            let mid = (top + bottom) / 2.0;
            assert!((mid.y - curve_height(x, length, curviness)).abs() < 1e-4);
            assert!((mid.x - (x - length / 2.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_uvs_stretch_lengthwise() {
        let mesh = build_ribbon_mesh(10.0, 2.0, PathResolution::RIBBON);
        assert_eq!(mesh.uvs.first(), Some(&[0.0, 1.0]));
        assert_eq!(mesh.uvs.last(), Some(&[1.0, 0.0]));
        for pair in mesh.uvs.chunks(2) {
            assert_eq!(pair[0][0], pair[1][0]);
        }
    }

    #[test]
    fn test_texture_request_scales_with_length() {
        let request = TextTextureRequest::for_ribbon("hello there world", 6.0);
        assert_eq!(request.width_px, 384);
        assert_eq!(request.height_px, 64);
        assert_eq!(request.text, "hello there world");
    }
}
