//! Wireframe pass for the player's collision and physics boxes.

use anyhow::Context;
use log::error;
use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::{
    core::StSystem,
    engine_state::{
        buffer_state::BufferState,
        physics::{Aabb, DEBUG_BOX_LINE_INDICES},
    },
};

use super::{
    bind_group_state::{BindGroupState, CAMERA_BIND_GROUP, CAMERA_BIND_GROUP_LAYOUT},
    vertex::DebugVertex,
};

/// Registry name of the debug vertex buffer
pub const DEBUG_VERTEX_BUFFER_NAME: &str = "debug_box_vertices";
/// Registry name of the debug index buffer
pub const DEBUG_INDEX_BUFFER_NAME: &str = "debug_box_indices";
/// Boxes the debug buffers have room for
pub const MAX_DEBUG_BOXES: usize = 4;

/// Line-list indices for `count` consecutive boxes of eight vertices each.
pub fn debug_box_indices(count: usize) -> Vec<u32> {
    (0..count as u32)
        .flat_map(|i| DEBUG_BOX_LINE_INDICES.iter().map(move |index| index + i * 8))
        .collect()
}

/// Corner vertices of every box that has a debug color, at most [`MAX_DEBUG_BOXES`].
pub fn debug_box_vertices<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Vec<DebugVertex> {
    boxes
        .into_iter()
        .filter_map(Aabb::debug_vertices)
        .take(MAX_DEBUG_BOXES)
        .flatten()
        .collect()
}

/// Draws colored box outlines over the world.
pub struct DebugRenderer {
    render_pipeline: RenderPipeline,
    buffer_state: StSystem<BufferState>,
    bind_group_state: StSystem<BindGroupState>,
}

impl DebugRenderer {
    /// Creates the line pipeline and its buffers.
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

            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Debug Render Pipeline Layout"),
                bind_group_layouts: &[camera_layout],
                push_constant_ranges: &[],
            })
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Debug Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Debug Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[DebugVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        {
            let mut buffers = buffer_state.get_mut();
            buffers.create_buffer(
                DEBUG_VERTEX_BUFFER_NAME,
                wgpu::BufferDescriptor {
                    label: Some(DEBUG_VERTEX_BUFFER_NAME),
                    size: (MAX_DEBUG_BOXES * 8 * std::mem::size_of::<DebugVertex>()) as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                },
            );
            buffers.create_buffer_init(
                DEBUG_INDEX_BUFFER_NAME,
                wgpu::util::BufferInitDescriptor {
                    label: Some(DEBUG_INDEX_BUFFER_NAME),
                    contents: bytemuck::cast_slice(&debug_box_indices(MAX_DEBUG_BOXES)),
                    usage: wgpu::BufferUsages::INDEX,
                },
            );
        }

        Ok(Self {
            render_pipeline,
            buffer_state,
            bind_group_state,
        })
    }

    /// Uploads the outlines of `boxes` and draws them.
    pub fn render<'a>(
        &self,
        render_pass: &mut RenderPass<'_>,
        boxes: impl IntoIterator<Item = &'a Aabb>,
    ) {
        let vertices = debug_box_vertices(boxes);
        if vertices.is_empty() {
            return;
        }

        if let Err(err) = self.buffer_state.get_mut().write_buffer(
            DEBUG_VERTEX_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&vertices),
        ) {
            error!("Failed to upload debug boxes: {}", err);
            return;
        }

        let bind_groups = self.bind_group_state.get();
        let Some(camera) = bind_groups.get_bind_group(CAMERA_BIND_GROUP) else {
            return;
        };
        let buffer_state = self.buffer_state.get();
        let (Some(vertex_buffer), Some(index_buffer)) = (
            buffer_state.get_buffer(DEBUG_VERTEX_BUFFER_NAME),
            buffer_state.get_buffer(DEBUG_INDEX_BUFFER_NAME),
        ) else {
            return;
        };

        let box_count = (vertices.len() / 8) as u32;
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..box_count * DEBUG_BOX_LINE_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Vector3};

    use super::*;

    #[test]
    fn indices_offset_by_eight_per_box() {
        let indices = debug_box_indices(2);

        assert_eq!(indices.len(), 96);
        assert_eq!(&indices[..48], &DEBUG_BOX_LINE_INDICES);
        assert_eq!(indices[48], DEBUG_BOX_LINE_INDICES[0] + 8);
        assert!(indices.iter().all(|&i| i < 16));
    }

    #[test]
    fn only_colored_boxes_are_outlined() {
        let plain = Aabb::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let colored = plain.with_debug_color(Vector3::new(1.0, 0.0, 0.0));

        let vertices = debug_box_vertices([&plain, &colored, &colored]);

        assert_eq!(vertices.len(), 16);
        assert!(vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0]));
    }
}
