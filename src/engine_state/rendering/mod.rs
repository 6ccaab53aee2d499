//! Rendering system for the voxel sandbox.
//!
//! This module contains the chunk mesh buffers, the block and debug pipelines and
//! the per-frame render pass. It owns the WebGPU surface and reconfigures it when
//! the window changes size or the surface is lost.

use log::{error, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, SurfaceError};

use crate::core::StSystem;

use super::buffer_state::BufferState;

mod bind_group_state;
pub mod debug_renderer;
pub mod meshing;
mod pipeline_manager;
pub mod texture;
pub mod vertex;

pub use pipeline_manager::FrameContents;
use pipeline_manager::PipelineManager;
pub use texture::{load_image, LoadedImage};
pub use vertex::Vertex;

/// Outcome of drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// The frame was presented
    Presented,
    /// No frame this time; try again next frame
    Skipped,
    /// The GPU is out of memory; the application should exit
    Fatal,
}

/// Owns the surface and the pipelines that draw into it.
pub struct MeshRendererManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: StSystem<Device>,
    /// The WebGPU queue for submitting command buffers
    pub queue: StSystem<Queue>,
    /// Manages the rendering pipelines
    pipeline_manager: PipelineManager,
}

impl MeshRendererManager {
    /// Creates the pipelines for `surface`.
    ///
    /// # Errors
    /// Fails if the camera buffer is not registered in `buffer_state`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: StSystem<Device>,
        queue: StSystem<Queue>,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        debug_shader_string: &str,
        atlas: &LoadedImage,
    ) -> anyhow::Result<Self> {
        let pipeline_manager = PipelineManager::new(
            &device.get(),
            &queue.get(),
            &surface_config,
            surface_config.format,
            buffer_state,
            shader_string,
            debug_shader_string,
            atlas,
        )?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
        })
    }

    /// Reconfigures the surface and depth texture for a new window size.
    ///
    /// Zero-sized windows (minimized) are ignored.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.configure();
    }

    fn configure(&mut self) {
        let device = self.device.get();
        self.surface.configure(&device, &self.surface_config);
        self.pipeline_manager.resize(&device, &self.surface_config);
    }

    /// Renders a new frame.
    pub fn render(&mut self, contents: &FrameContents<'_>) -> RenderStatus {
        let result = self.pipeline_manager.render(
            &self.surface,
            &self.device.get(),
            &self.queue.get(),
            contents,
        );

        match result {
            Ok(()) => RenderStatus::Presented,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                warn!("Surface lost or outdated; reconfiguring");
                self.configure();
                RenderStatus::Skipped
            }
            Err(SurfaceError::Timeout) => {
                warn!("Timed out waiting for a surface texture");
                RenderStatus::Skipped
            }
            Err(err) => {
                error!("Unrecoverable surface error: {:?}", err);
                RenderStatus::Fatal
            }
        }
    }
}
