//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//! - GPU uniform buffer layout
//!
//! ## Key Components
//! - `Camera`: Position plus yaw/pitch in degrees and the basis derived from them
//! - `Projection`: Manages perspective projection settings
//! - `CameraUniform`: Packed data structure for GPU shaders
//!
//! ## Orientation
//! A yaw of 0° looks down negative Z and yaw grows counter-clockwise seen from
//! above; the basis is `front`, `right = front × world up` and `up = right × front`.

use cgmath::*;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU uses a coordinate system where:
/// - X is right
/// - Y is up
/// - NDC (Normalized Device Coordinates) range from -1 to 1 in X and Y, and 0 to 1 in Z
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Pitch limit in degrees; looking straight up or down would make `right` degenerate.
pub const MAX_PITCH: f32 = 89.0;

/// Near clipping plane distance.
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance.
pub const Z_FAR: f32 = 1000.0;

/// Represents a first-person camera in 3D space.
#[derive(Debug, Clone)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation around Y
    yaw: Deg<f32>,
    /// Vertical rotation, clamped to `±MAX_PITCH`
    pitch: Deg<f32>,
    /// Normalized viewing direction
    front: Vector3<f32>,
    /// Normalized vector pointing to the camera's right
    right: Vector3<f32>,
    /// Normalized vector pointing out of the top of the camera
    up: Vector3<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space. Can be any type that converts to `Point3<f32>`.
    /// * `yaw` - Initial yaw. Can be any type that converts to `Deg<f32>`.
    /// * `pitch` - Initial pitch, clamped to `±MAX_PITCH`.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Deg<f32>>, P: Into<Deg<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
            front: Vector3::zero(),
            right: Vector3::zero(),
            up: Vector3::zero(),
        };
        camera.pitch = Deg(camera.pitch.0.clamp(-MAX_PITCH, MAX_PITCH));
        camera.update_vectors();
        camera
    }

    /// Gets the camera's forward direction vector.
    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Applies a mouse movement in pixels.
    ///
    /// Moving the mouse right turns right and moving it down looks down.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        self.yaw -= Deg(delta_x * sensitivity);
        self.pitch = Deg((self.pitch.0 - delta_y * sensitivity).clamp(-MAX_PITCH, MAX_PITCH));
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = (self.yaw + Deg(180.0)).sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();

        self.front = Vector3::new(yaw_sin * pitch_cos, pitch_sin, yaw_cos * pitch_cos).normalize();
        self.right = self.front.cross(Vector3::unit_y()).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 view matrix that can be used for rendering
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene.
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// GPU-friendly representation of camera data for shaders.
///
/// This struct is used to pass camera data to the GPU in a format that matches
/// the layout expected by the shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have to convert the Matrix4 into a 4x4 f32 array
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
    /// Sun height in `[0, 1]` in the first lane; the rest is padding
    daylight: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix, zero position and full daylight.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
            daylight: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position based on the current camera state.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        let viewproj = projection.calc_matrix() * camera.calc_matrix();
        self.view_proj = viewproj.into();
        let pos3: [f32; 3] = camera.position.into();

        self.position = [pos3[0], pos3[1], pos3[2], 1.0];
    }

    pub fn set_daylight(&mut self, sun: f32) {
        self.daylight[0] = sun;
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
