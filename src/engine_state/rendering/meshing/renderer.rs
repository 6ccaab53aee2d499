//! Meshing renderer module for the voxel engine.
//!
//! Draws every loaded chunk from its own vertex/index buffer pair, one
//! `draw_indexed` call per chunk covering the indices written since the last
//! rebuild.
//!
//! # Architecture
//!
//! The meshing renderer is responsible for:
//! 1. Creating and managing the block render pipeline
//! 2. Binding the camera uniform and the block atlas
//! 3. Issuing one draw per non-empty chunk mesh
//!
//! Clear blocks (glass, water) are written into the same buffers as opaque ones
//! and rely on alpha blending, so draw order within a chunk follows mesh order.

use anyhow::Context;
use cgmath::Point2;
use log::warn;
use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::{
    core::StSystem,
    engine_state::{
        buffer_state::BufferState,
        rendering::{
            bind_group_state::{
                BindGroupState, CAMERA_BIND_GROUP, CAMERA_BIND_GROUP_LAYOUT, TEXTURE_BIND_GROUP,
                TEXTURE_BIND_GROUP_LAYOUT,
            },
            Vertex,
        },
    },
};

use super::chunk_buffer_names;

/// One chunk's worth of drawing: where its buffers live and how many indices to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDraw {
    pub position: Point2<i32>,
    pub draw_length: u32,
}

/// Draws chunk meshes with the block shader.
pub struct MeshingRenderer {
    render_pipeline: RenderPipeline,
    buffer_state: StSystem<BufferState>,
    bind_group_state: StSystem<BindGroupState>,
}

impl MeshingRenderer {
    /// Creates the block render pipeline.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Registry holding the chunk buffers
    /// * `shader_string` - The block WGSL source, with `vs_main` and `fs_main`
    /// * `texture_format` - The surface format
    /// * `bind_group_state` - Holds the camera and atlas bind groups
    /// * `depth_stencil` - Depth state shared with the other passes
    pub fn new(
        device: &Device,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        texture_format: TextureFormat,
        bind_group_state: StSystem<BindGroupState>,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> anyhow::Result<Self> {
        let pipeline_layout = {
            let bind_groups = bind_group_state.get();
            let camera_layout = bind_groups
                .get_bind_group_layout(CAMERA_BIND_GROUP_LAYOUT)
                .context("camera bind group layout is missing")?;
            let texture_layout = bind_groups
                .get_bind_group_layout(TEXTURE_BIND_GROUP_LAYOUT)
                .context("texture bind group layout is missing")?;

            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Block Render Pipeline Layout"),
                bind_group_layouts: &[camera_layout, texture_layout],
                push_constant_ranges: &[],
            })
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Block Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            render_pipeline,
            buffer_state,
            bind_group_state,
        })
    }

    /// Draws each chunk's mesh. Chunks with nothing to draw are skipped.
    pub fn render(&self, render_pass: &mut RenderPass<'_>, chunks: &[ChunkDraw]) {
        let bind_groups = self.bind_group_state.get();
        let (Some(camera), Some(atlas)) = (
            bind_groups.get_bind_group(CAMERA_BIND_GROUP),
            bind_groups.get_bind_group(TEXTURE_BIND_GROUP),
        ) else {
            warn!("Block bind groups are missing; skipping chunk draw");
            return;
        };

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera, &[]);
        render_pass.set_bind_group(1, atlas, &[]);

        let buffer_state = self.buffer_state.get();
        for chunk in chunks.iter().filter(|chunk| chunk.draw_length > 0) {
            let (vertex_buffer_name, index_buffer_name) = chunk_buffer_names(chunk.position);
            let (Some(vertices), Some(indices)) = (
                buffer_state.get_buffer(&vertex_buffer_name),
                buffer_state.get_buffer(&index_buffer_name),
            ) else {
                warn!("Chunk {:?} has no GPU buffers", chunk.position);
                continue;
            };

            render_pass.set_vertex_buffer(0, vertices.slice(..));
            render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..chunk.draw_length, 0, 0..1);
        }
    }
}
