//! Vertex data structures and layouts.
//!
//! Two formats are drawn: block faces, which carry a baked ambient-occlusion
//! brightness and atlas coordinates, and debug lines, which carry a flat color.

/// A vertex of a block face.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Brightness: f32 (4 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 24 bytes, i.e. six floats; a chunk's vertex stream is a slice of
/// these reinterpreted as `&[f32]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position
    pub position: [f32; 3],
    /// Ambient occlusion factor in `[0.625, 1.0]`
    pub brightness: f32,
    /// Atlas UV coordinates
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Returns the vertex buffer layout description for the block pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: brightness (f32)
    /// - `location = 2`: tex_coords (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x2];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A vertex of a debug wireframe line.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Linear RGB color
    pub color: [f32; 3],
}

impl DebugVertex {
    /// Returns the vertex buffer layout description for the debug pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DebugVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
