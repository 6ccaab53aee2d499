//! # Voxel World
//!
//! Everything that describes the world as data: what blocks exist, how terrain
//! is generated, how voxels are grouped into chunks and edited, and how rays
//! find the block under the crosshair.
//!
//! ## Architecture
//!
//! * **Block**: The block registry (types, face textures, opacity)
//! * **Terrain**: Seeded noise that decides heights and caves
//! * **Chunk**: 16x16 columns of voxels with a mesh and an edit queue
//! * **World**: The set of loaded chunks, addressed in world coordinates
//! * **Ray cast**: Stepping along a view ray to the first solid voxel
//!
//! ## Data Flow
//!
//! 1. The world creates chunks, which generate their terrain and build a mesh
//! 2. Player actions queue edits on the chunk owning the target voxel
//! 3. Each frame the world drains the queues under a time budget
//! 4. Every applied edit rebuilds the owning chunk's mesh

use cgmath::Point3;

pub mod block;
pub mod chunk;
pub mod ray_cast;
pub mod terrain;
pub mod world;

/// Read access to voxel occupancy.
///
/// Implemented by anything physics and ray casting can query: a single chunk
/// in tests, the whole world at runtime.
pub trait VoxelGrid {
    /// Whether a block occupies the integer position.
    fn is_occupied(&self, position: Point3<i32>) -> bool;
}
