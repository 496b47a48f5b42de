//! Scene graph backed by wgpu
//!
//! Each node owns its uploaded mesh and a small uniform with its offset and
//! tint. The camera is one shared uniform written every frame.

use wgpu::util::DeviceExt;

use super::uniforms::{CameraUniform, NodeUniform};
use super::{GpuMesh, MeshVertex};
use crate::camera::Camera;
use crate::geometry::MeshData;
use crate::scene::{NodeKind, SceneGraph, Transform};

/// Surfaces first, then the ribbons over their front faces, then the player
pub const DRAW_ORDER: [NodeKind; 3] = [
    NodeKind::PlatformSurface,
    NodeKind::TextRibbon,
    NodeKind::Player,
];

struct GpuNode {
    kind: NodeKind,
    mesh: GpuMesh,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuScene {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    node_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    nodes: Vec<Option<GpuNode>>,
    aspect: f32,
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        aspect: f32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let camera_layout = uniform_layout(device, "camera_layout");
        let node_layout = uniform_layout(device, "node_layout");

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera"),
            contents: bytemuck::bytes_of(&CameraUniform::new(&Camera::default(), aspect)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group =
            uniform_bind_group(device, &camera_layout, &camera_buffer, "camera_bind_group");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &node_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            node_layout,
            camera_buffer,
            camera_bind_group,
            nodes: Vec::new(),
            aspect,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Record draw calls for every live node
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for kind in DRAW_ORDER {
            for node in self.nodes.iter().flatten().filter(|n| n.kind == kind) {
                pass.set_bind_group(1, &node.bind_group, &[]);
                node.mesh.draw(pass);
            }
        }
    }
}

impl SceneGraph for GpuScene {
    type Handle = usize;

    fn add_node(&mut self, kind: NodeKind, mesh: &MeshData, transform: Transform) -> usize {
        let label = format!("{:?}", kind);
        let mesh = GpuMesh::upload(&self.device, mesh, &label);
        let uniform = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: bytemuck::bytes_of(&NodeUniform::new(kind, transform)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = uniform_bind_group(&self.device, &self.node_layout, &uniform, &label);

        self.nodes.push(Some(GpuNode {
            kind,
            mesh,
            uniform,
            bind_group,
        }));
        self.nodes.len() - 1
    }

    fn remove_node(&mut self, handle: usize) {
        if let Some(slot) = self.nodes.get_mut(handle) {
            *slot = None;
        }
        // Trailing free slots can be reused
        while matches!(self.nodes.last(), Some(None)) {
            self.nodes.pop();
        }
    }

    fn set_transform(&mut self, handle: usize, transform: Transform) {
        if let Some(Some(node)) = self.nodes.get(handle) {
            self.queue.write_buffer(
                &node.uniform,
                0,
                bytemuck::bytes_of(&NodeUniform::new(node.kind, transform)),
            );
        }
    }

    fn update_camera(&mut self, camera: &Camera) {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::new(camera, self.aspect)),
        );
    }
}
