//! Manages the WebGPU render passes and the resources they share.
//!
//! # Architecture
//!
//! - `PipelineManager`: Owns the depth texture and runs one render pass per frame
//! - `MeshingRenderer`: Draws chunk meshes with the block pipeline
//! - `DebugRenderer`: Draws box outlines with a line-list pipeline
//!
//! Both renderers read the camera uniform through the shared `BindGroupState`.

use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceError, TextureFormat};

use crate::{core::StSystem, engine_state::physics::Aabb};

use super::{
    bind_group_state::BindGroupState,
    debug_renderer::DebugRenderer,
    meshing::{ChunkDraw, MeshingRenderer},
    texture::{self, LoadedImage},
    super::buffer_state::BufferState,
};

/// Everything drawn in one frame.
pub struct FrameContents<'a> {
    /// Chunk meshes to draw
    pub chunks: &'a [ChunkDraw],
    /// Boxes to outline; empty when debug drawing is off
    pub debug_boxes: &'a [&'a Aabb],
    /// Background color
    pub sky: wgpu::Color,
}

/// Coordinates the block and debug renderers.
pub struct PipelineManager {
    /// Depth texture used for depth testing
    pub depth_texture: texture::Texture,
    /// Meshing renderer for chunk meshes
    pub meshing_renderer: MeshingRenderer,
    /// Renderer for debug box outlines
    pub debug_renderer: DebugRenderer,
}

impl PipelineManager {
    /// Creates the bind groups, the depth texture and both renderers.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue, used to upload the atlas
    /// * `config` - Surface configuration containing size and format
    /// * `texture_format` - The texture format to render into
    /// * `buffer_state` - Registry holding the camera and chunk buffers
    /// * `shader_string` - Block WGSL source
    /// * `debug_shader_string` - Debug line WGSL source
    /// * `atlas` - Decoded block atlas
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &Device,
        queue: &Queue,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        debug_shader_string: &str,
        atlas: &LoadedImage,
    ) -> anyhow::Result<Self> {
        let bind_group_state = StSystem::new(Box::new(BindGroupState::new(
            device,
            queue,
            &buffer_state.get(),
            atlas,
        )?));

        let depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let meshing_renderer = MeshingRenderer::new(
            device,
            buffer_state.clone(),
            shader_string,
            texture_format,
            bind_group_state.clone(),
            depth_stencil.clone(),
        )?;

        let debug_renderer = DebugRenderer::new(
            device,
            buffer_state,
            debug_shader_string,
            texture_format,
            bind_group_state,
            depth_stencil,
        )?;

        Ok(Self {
            depth_texture,
            meshing_renderer,
            debug_renderer,
        })
    }

    /// Renders a frame to the given surface.
    ///
    /// # Errors
    /// Returns the surface error if no frame could be acquired; nothing is drawn.
    pub fn render(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        contents: &FrameContents<'_>,
    ) -> Result<(), SurfaceError> {
        let frame = surface.get_current_texture()?;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(contents.sky),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            self.meshing_renderer.render(&mut rpass, contents.chunks);

            if !contents.debug_boxes.is_empty() {
                self.debug_renderer
                    .render(&mut rpass, contents.debug_boxes.iter().copied());
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
