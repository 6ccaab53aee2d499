//! Mesh storage in GPU buffers owned by the shared [`BufferState`] registry.

use cgmath::Point2;
use log::trace;

use crate::{core::StSystem, engine_state::buffer_state::BufferState};

use super::{MeshBufferTarget, MeshError};

const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;
const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Registry names of a chunk's vertex and index buffers.
///
/// # Returns
/// `(vertex buffer name, index buffer name)`
pub fn chunk_buffer_names(chunk_position: Point2<i32>) -> (String, String) {
    let prefix = format!("chunk_{}_{}", chunk_position.x, chunk_position.y);
    (format!("{prefix}_vertices"), format!("{prefix}_indices"))
}

/// Writes a mesh into a named vertex/index buffer pair.
pub struct GpuMeshTarget {
    buffer_state: StSystem<BufferState>,
    vertex_buffer_name: String,
    index_buffer_name: String,
}

impl GpuMeshTarget {
    /// Creates a target writing to the buffers of the chunk at `chunk_position`.
    ///
    /// No storage exists until the owning `MeshBuffer` allocates it.
    pub fn for_chunk(buffer_state: StSystem<BufferState>, chunk_position: Point2<i32>) -> Self {
        let (vertex_buffer_name, index_buffer_name) = chunk_buffer_names(chunk_position);
        Self {
            buffer_state,
            vertex_buffer_name,
            index_buffer_name,
        }
    }
}

impl MeshBufferTarget for GpuMeshTarget {
    fn allocate(&mut self, vertex_capacity: usize, index_capacity: usize) -> Result<(), MeshError> {
        let mut buffer_state = self.buffer_state.get_mut();

        buffer_state.create_buffer(
            &self.vertex_buffer_name,
            wgpu::BufferDescriptor {
                label: Some(&self.vertex_buffer_name),
                size: vertex_capacity as u64 * FLOAT_SIZE,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );
        buffer_state.create_buffer(
            &self.index_buffer_name,
            wgpu::BufferDescriptor {
                label: Some(&self.index_buffer_name),
                size: index_capacity as u64 * INDEX_SIZE,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );

        trace!(
            "Allocated {} and {} ({} bytes total)",
            self.vertex_buffer_name,
            self.index_buffer_name,
            vertex_capacity as u64 * FLOAT_SIZE + index_capacity as u64 * INDEX_SIZE
        );
        Ok(())
    }

    fn write_vertices(&mut self, offset: usize, vertices: &[f32]) -> Result<(), MeshError> {
        self.buffer_state.get_mut().write_buffer(
            &self.vertex_buffer_name,
            offset as u64 * FLOAT_SIZE,
            bytemuck::cast_slice(vertices),
        )?;
        Ok(())
    }

    fn write_indices(&mut self, offset: usize, indices: &[u32]) -> Result<(), MeshError> {
        self.buffer_state.get_mut().write_buffer(
            &self.index_buffer_name,
            offset as u64 * INDEX_SIZE,
            bytemuck::cast_slice(indices),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_names_are_unique_per_chunk() {
        let (vertices, indices) = chunk_buffer_names(Point2::new(-1, 3));

        assert_eq!(vertices, "chunk_-1_3_vertices");
        assert_eq!(indices, "chunk_-1_3_indices");
        assert_ne!(chunk_buffer_names(Point2::new(3, -1)).0, vertices);
    }
}
