//! Mesh buffer management for chunk rendering.
//!
//! Every chunk owns one [`MeshBuffer`]: a vertex/index buffer pair pre-sized for
//! the worst case a chunk can produce, filled by appending vertex streams and
//! emptied by orphaning the storage.
//!
//! # Architecture
//! - `MeshBuffer`: Offset bookkeeping, stride validation and quad index generation
//! - `MeshBufferTarget`: The storage seam; allocate and write at element offsets
//! - `GpuMeshTarget`: Storage in the shared `BufferState` registry
//! - `MeshingRenderer`: Draws every chunk's buffers with `draw_indexed`
//!
//! # Vertex Stream Layout
//! Six floats per vertex: position.xyz, brightness, uv. Every four consecutive
//! vertices form one quad, split into two triangles by the generated indices.
//!
//! # Performance Considerations
//! - Storage is allocated once for the worst case so appends never reallocate
//! - Indices are generated on the CPU alongside each append, never re-uploaded

use std::fmt;

use crate::engine_state::{
    buffer_state::BufferError,
    voxels::chunk::{CHUNK_SIZE, MAX_HEIGHT},
};

mod gpu_target;
#[cfg(test)]
pub mod memory_target;
mod renderer;

pub use gpu_target::{chunk_buffer_names, GpuMeshTarget};
pub use renderer::{ChunkDraw, MeshingRenderer};

/// Floats per vertex: position.xyz, brightness, uv.
pub const FLOATS_PER_VERTEX: usize = 6;
/// Vertices emitted per block when all six faces are visible.
pub const VERTS_PER_BLOCK: usize = 24;
/// Indices per quad face.
pub const INDICES_PER_FACE: usize = 6;
/// Faces per block.
pub const FACES_PER_BLOCK: usize = 6;

/// Vertex floats reserved per chunk.
pub const CHUNK_VERTEX_CAPACITY: usize =
    CHUNK_SIZE * CHUNK_SIZE * MAX_HEIGHT as usize * FLOATS_PER_VERTEX * VERTS_PER_BLOCK;
/// Indices reserved per chunk.
pub const CHUNK_INDEX_CAPACITY: usize =
    CHUNK_SIZE * CHUNK_SIZE * MAX_HEIGHT as usize * INDICES_PER_FACE * FACES_PER_BLOCK;

/// Which half of a mesh buffer an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStream {
    Vertices,
    Indices,
}

/// Structural failures of a mesh buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The vertex stream length is not a multiple of [`FLOATS_PER_VERTEX`].
    MalformedVertexStream { floats: usize },
    /// An append would write past the pre-allocated storage.
    CapacityExceeded {
        stream: MeshStream,
        requested: usize,
        capacity: usize,
    },
    /// The storage behind the buffer rejected a write.
    Buffer(BufferError),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::MalformedVertexStream { floats } => write!(
                f,
                "vertex stream of {} floats is not a whole number of vertices; \
                 each vertex needs {} floats (position.xyz, brightness, uv)",
                floats, FLOATS_PER_VERTEX
            ),
            MeshError::CapacityExceeded {
                stream,
                requested,
                capacity,
            } => write!(
                f,
                "{:?} need {} elements but the mesh buffer holds {}",
                stream, requested, capacity
            ),
            MeshError::Buffer(err) => write!(f, "mesh buffer write failed: {}", err),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Buffer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BufferError> for MeshError {
    fn from(err: BufferError) -> Self {
        MeshError::Buffer(err)
    }
}

/// Storage behind a [`MeshBuffer`].
///
/// Offsets and capacities are in elements (floats for vertices, `u32`s for
/// indices), never bytes.
pub trait MeshBufferTarget {
    /// Replaces both buffers with fresh, uninitialized storage of the given size.
    fn allocate(&mut self, vertex_capacity: usize, index_capacity: usize)
        -> Result<(), MeshError>;

    /// Writes vertex floats starting at element `offset`.
    fn write_vertices(&mut self, offset: usize, vertices: &[f32]) -> Result<(), MeshError>;

    /// Writes indices starting at element `offset`.
    fn write_indices(&mut self, offset: usize, indices: &[u32]) -> Result<(), MeshError>;
}

/// Generates two triangles per quad for `vertex_count` vertices, numbered from `base`.
///
/// Trailing vertices that do not complete a quad get no indices.
pub fn quad_indices(base: u32, vertex_count: usize) -> Vec<u32> {
    (0..(vertex_count / 4) as u32)
        .flat_map(|quad| {
            let i0 = base + quad * 4;
            [i0, i0 + 1, i0 + 2, i0 + 2, i0 + 3, i0]
        })
        .collect()
}

/// A pre-allocated vertex/index buffer pair with append-only writes.
pub struct MeshBuffer {
    target: Box<dyn MeshBufferTarget>,
    vertex_capacity: usize,
    index_capacity: usize,
    /// Vertex floats written since the last reset
    vertex_end: usize,
    /// Indices written since the last reset
    draw_length: usize,
}

impl MeshBuffer {
    /// Allocates a buffer sized for the densest possible chunk.
    pub fn new(target: Box<dyn MeshBufferTarget>) -> Result<Self, MeshError> {
        Self::with_capacity(target, CHUNK_VERTEX_CAPACITY, CHUNK_INDEX_CAPACITY)
    }

    /// Allocates a buffer of `vertex_capacity` floats and `index_capacity` indices.
    pub fn with_capacity(
        mut target: Box<dyn MeshBufferTarget>,
        vertex_capacity: usize,
        index_capacity: usize,
    ) -> Result<Self, MeshError> {
        target.allocate(vertex_capacity, index_capacity)?;
        Ok(Self {
            target,
            vertex_capacity,
            index_capacity,
            vertex_end: 0,
            draw_length: 0,
        })
    }

    /// Appends a vertex stream and the quad indices that draw it.
    ///
    /// # Errors
    /// - `MalformedVertexStream` if `vertices.len()` is not a multiple of six
    /// - `CapacityExceeded` if either stream would overrun its storage; nothing is written
    pub fn append(&mut self, vertices: &[f32]) -> Result<(), MeshError> {
        if vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(MeshError::MalformedVertexStream {
                floats: vertices.len(),
            });
        }
        if vertices.is_empty() {
            return Ok(());
        }

        let vertex_end = self.vertex_end + vertices.len();
        if vertex_end > self.vertex_capacity {
            return Err(MeshError::CapacityExceeded {
                stream: MeshStream::Vertices,
                requested: vertex_end,
                capacity: self.vertex_capacity,
            });
        }

        let base = (self.vertex_end / FLOATS_PER_VERTEX) as u32;
        let indices = quad_indices(base, vertices.len() / FLOATS_PER_VERTEX);
        let draw_length = self.draw_length + indices.len();
        if draw_length > self.index_capacity {
            return Err(MeshError::CapacityExceeded {
                stream: MeshStream::Indices,
                requested: draw_length,
                capacity: self.index_capacity,
            });
        }

        self.target.write_vertices(self.vertex_end, vertices)?;
        self.target.write_indices(self.draw_length, &indices)?;

        self.vertex_end = vertex_end;
        self.draw_length = draw_length;
        Ok(())
    }

    /// Orphans the storage and rewinds both offsets to zero.
    pub fn reset(&mut self) -> Result<(), MeshError> {
        self.target
            .allocate(self.vertex_capacity, self.index_capacity)?;
        self.vertex_end = 0;
        self.draw_length = 0;
        Ok(())
    }

    /// Number of indices to draw.
    pub fn draw_length(&self) -> u32 {
        self.draw_length as u32
    }

    /// Number of vertices written since the last reset.
    #[cfg(test)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_end / FLOATS_PER_VERTEX
    }

    /// Whether nothing has been written since the last reset.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.draw_length == 0
    }
}

#[cfg(test)]
mod tests {
    use super::memory_target::MemoryTarget;
    use super::*;

    fn quad(brightness: f32) -> Vec<f32> {
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
            .iter()
            .flat_map(|&[x, y]| [x, y, 0.0, brightness, x, y])
            .collect()
    }

    fn small_buffer() -> (MeshBuffer, MemoryTarget) {
        let target = MemoryTarget::default();
        let buffer = MeshBuffer::with_capacity(Box::new(target.clone()), 6 * 8, 12).unwrap();
        (buffer, target)
    }

    #[test]
    fn quad_indices_form_two_triangles_per_quad() {
        assert_eq!(
            quad_indices(4, 8),
            vec![4, 5, 6, 6, 7, 4, 8, 9, 10, 10, 11, 8]
        );
        assert!(quad_indices(0, 3).is_empty());
    }

    #[test]
    fn append_rejects_partial_vertices() {
        let (mut buffer, target) = small_buffer();

        let err = buffer.append(&[0.0; 7]).unwrap_err();

        assert_eq!(err, MeshError::MalformedVertexStream { floats: 7 });
        assert_eq!(buffer.draw_length(), 0);
        assert!(target.vertices().is_empty());
    }

    #[test]
    fn appends_advance_offsets_monotonically() {
        let (mut buffer, target) = small_buffer();

        buffer.append(&quad(1.0)).unwrap();
        assert_eq!(buffer.draw_length(), 6);
        assert_eq!(buffer.vertex_count(), 4);

        buffer.append(&quad(0.5)).unwrap();
        assert_eq!(buffer.draw_length(), 12);
        assert_eq!(buffer.vertex_count(), 8);

        assert_eq!(target.indices(), vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert_eq!(target.vertices()[24 + 3], 0.5);
    }

    #[test]
    fn append_past_capacity_fails_without_writing() {
        let (mut buffer, target) = small_buffer();
        buffer.append(&quad(1.0)).unwrap();
        buffer.append(&quad(1.0)).unwrap();

        let err = buffer.append(&quad(1.0)).unwrap_err();

        assert_eq!(
            err,
            MeshError::CapacityExceeded {
                stream: MeshStream::Vertices,
                requested: 72,
                capacity: 48,
            }
        );
        assert_eq!(buffer.draw_length(), 12);
        assert_eq!(target.indices().len(), 12);
    }

    #[test]
    fn reset_reallocates_and_rewinds() {
        let (mut buffer, target) = small_buffer();
        buffer.append(&quad(1.0)).unwrap();

        buffer.reset().unwrap();

        assert!(buffer.is_empty());
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(target.allocations(), 2);

        buffer.append(&quad(1.0)).unwrap();
        assert_eq!(target.indices(), vec![0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn empty_append_is_a_no_op() {
        let (mut buffer, _) = small_buffer();

        buffer.append(&[]).unwrap();

        assert!(buffer.is_empty());
    }

    #[test]
    fn chunk_capacity_covers_every_face_of_every_block() {
        assert_eq!(CHUNK_VERTEX_CAPACITY, 16 * 16 * 128 * 6 * 24);
        assert_eq!(CHUNK_INDEX_CAPACITY, 16 * 16 * 128 * 6 * 6);
    }
}
