//! # Camera State Management
//!
//! This module owns the GPU side of the camera:
//! - The projection, resized with the window
//! - The camera uniform (view-projection, eye position, daylight)
//! - The uniform buffer it is uploaded to every frame
//!
//! The [`camera::Camera`] itself belongs to the player, whose physics decide
//! where it is. `CameraState` only turns it into shader data.

use cgmath::{Deg, Point3};

use crate::core::StSystem;

use super::{buffer_state::BufferState, voxels::chunk::MAX_HEIGHT};

pub mod camera;

use camera::{Camera, CameraUniform, Projection, Z_FAR, Z_NEAR};

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// Where a new player's eyes start: above the origin column, looking along -X.
pub fn spawn_camera() -> Camera {
    Camera::new(
        Point3::new(0.0, MAX_HEIGHT as f32 + 4.0, 0.0),
        Deg(90.0),
        Deg(0.0),
    )
}

/// Manages the camera projection and its GPU uniform.
///
/// # Fields
/// - `projection`: Perspective settings, updated on resize
/// - `camera_uniform`: GPU-optimized camera data for shaders
/// - `buffer_state`: Manages GPU buffer state
pub struct CameraState {
    pub projection: Projection,
    pub camera_uniform: CameraUniform,
    pub buffer_state: StSystem<BufferState>,
}

impl CameraState {
    /// Creates the projection and the camera uniform buffer.
    ///
    /// # Arguments
    /// * `buffer_state` - The buffer state system for GPU resource management
    /// * `camera` - Camera used to fill the initial uniform
    /// * `size` - Surface size in pixels
    /// * `fov` - Vertical field of view
    pub fn new(
        buffer_state: StSystem<BufferState>,
        camera: &Camera,
        size: (u32, u32),
        fov: Deg<f32>,
    ) -> Self {
        let projection = Projection::new(size.0, size.1, fov, Z_NEAR, Z_FAR);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(camera, &projection);

        buffer_state.get_mut().create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            projection,
            camera_uniform,
            buffer_state,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Rebuilds the uniform from `camera` and the sun height, then uploads it.
    pub fn update(&mut self, camera: &Camera, daylight: f32) {
        self.camera_uniform
            .update_view_proj_and_pos(camera, &self.projection);
        self.camera_uniform.set_daylight(daylight);

        if let Err(err) = self.buffer_state.get_mut().write_buffer(
            CAMERA_BUFFER_NAME,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        ) {
            log::error!("Failed to upload camera uniform: {}", err);
        }
    }
}
