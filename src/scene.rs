//! Render engine boundary
//!
//! The game hands meshes and transforms to whatever scene graph the host
//! uses. Nothing here depends on a particular engine.

use glam::Vec3;

use crate::camera::Camera;
use crate::geometry::MeshData;
use crate::renderer::vertex::colors;

/// What a node carries, so the engine can pick a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    PlatformSurface,
    /// Text band; the engine rasterizes the platform's sentence onto it
    TextRibbon,
    Player,
}

impl NodeKind {
    /// Base tint for the node's material
    pub fn base_color(&self) -> [f32; 4] {
        match self {
            NodeKind::PlatformSurface => colors::PLATFORM,
            NodeKind::TextRibbon => colors::TEXT,
            NodeKind::Player => colors::PLAYER,
        }
    }
}

/// Local transform of a node (translation only; meshes are built in place)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation }
    }
}

/// Scene graph capabilities the game needs
pub trait SceneGraph {
    type Handle: Copy;

    fn add_node(&mut self, kind: NodeKind, mesh: &MeshData, transform: Transform) -> Self::Handle;
    fn remove_node(&mut self, handle: Self::Handle);
    fn set_transform(&mut self, handle: Self::Handle, transform: Transform);
    fn update_camera(&mut self, camera: &Camera);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Scene graph that just records what it was told
    #[derive(Debug, Default)]
    pub struct RecordingScene {
        pub nodes: Vec<Option<(NodeKind, usize, Transform)>>,
        pub camera_updates: usize,
    }

    impl RecordingScene {
        pub fn live_nodes(&self) -> usize {
            self.nodes.iter().flatten().count()
        }
    }

    impl SceneGraph for RecordingScene {
        type Handle = usize;

        fn add_node(&mut self, kind: NodeKind, mesh: &MeshData, transform: Transform) -> usize {
            self.nodes.push(Some((kind, mesh.vertex_count(), transform)));
            self.nodes.len() - 1
        }

        fn remove_node(&mut self, handle: usize) {
            self.nodes[handle] = None;
        }

        fn set_transform(&mut self, handle: usize, transform: Transform) {
            if let Some(node) = self.nodes[handle].as_mut() {
                node.2 = transform;
            }
        }

        fn update_camera(&mut self, _camera: &Camera) {
            self.camera_updates += 1;
        }
    }
}
