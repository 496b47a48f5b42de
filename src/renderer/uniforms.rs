//! Uniform blocks shared with `mesh.wgsl`

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::scene::{NodeKind, Transform};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(camera: &Camera, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
        }
    }
}

/// Per-node offset and tint; vec4s keep WGSL uniform alignment
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct NodeUniform {
    pub offset: [f32; 4],
    pub tint: [f32; 4],
}

impl NodeUniform {
    pub fn new(kind: NodeKind, transform: Transform) -> Self {
        Self {
            offset: transform.translation.extend(0.0).to_array(),
            tint: kind.base_color(),
        }
    }
}
