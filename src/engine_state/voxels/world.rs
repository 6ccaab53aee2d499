//! # World Module
//!
//! This module provides the `World` struct which owns the loaded chunks and
//! routes world-coordinate queries and edits to the chunk that holds them.
//!
//! ## Architecture
//!
//! Chunks are kept in a hash map keyed by chunk coordinates. A voxel belongs to
//! the chunk `(floor(x / 16), floor(z / 16))`; there is no vertical chunking, so
//! a chunk spans every height.
//!
//! The running game loads a single chunk at the origin. Nothing prevents more
//! chunks from being inserted, but face culling and ambient occlusion only look
//! inside the chunk being meshed.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Edit processing is budgeted per chunk, so the frame cost stays bounded no
//!   matter how many edits are queued

use std::collections::HashMap;

use cgmath::{Point2, Point3, Vector3};
use log::{debug, info};
use web_time::Duration;

use crate::engine_state::{
    rendering::meshing::{MeshBuffer, MeshBufferTarget, MeshError},
    voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, CHUNK_SIZE},
        ray_cast::ray_cast,
        VoxelGrid,
    },
};

/// A voxel world composed of chunks sharing one seed.
pub struct World {
    seed: u32,
    chunks: HashMap<Point2<i32>, Chunk>,
}

/// Returns the coordinates of the chunk containing `position`.
pub fn chunk_position_of(position: Point3<i32>) -> Point2<i32> {
    Point2::new(
        position.x.div_euclid(CHUNK_SIZE as i32),
        position.z.div_euclid(CHUNK_SIZE as i32),
    )
}

impl World {
    /// Creates a world with no chunks loaded.
    pub fn new(seed: u32) -> Self {
        info!("Creating world with seed {}", seed);
        World {
            seed,
            chunks: HashMap::new(),
        }
    }

    /// Generates the chunk at `position` into a mesh buffer backed by `target`.
    ///
    /// Does nothing if the chunk is already loaded.
    ///
    /// # Errors
    /// Propagates failures to allocate or fill the chunk's mesh.
    pub fn load_chunk(
        &mut self,
        position: Point2<i32>,
        target: Box<dyn MeshBufferTarget>,
    ) -> Result<(), MeshError> {
        if self.chunks.contains_key(&position) {
            return Ok(());
        }

        let chunk = Chunk::generated(position, self.seed, MeshBuffer::new(target)?)?;
        self.insert_chunk(chunk);
        Ok(())
    }

    /// Adds an already built chunk, replacing any chunk at the same coordinates.
    pub fn insert_chunk(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.position(), chunk);
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    pub fn chunk(&self, position: Point2<i32>) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Iterates over every loaded chunk.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// The block at a world position, or `None` for air and unloaded chunks.
    pub fn block_at(&self, position: Point3<i32>) -> Option<BlockType> {
        self.chunk(chunk_position_of(position))?.block_at(position)
    }

    /// Queues an edit on the chunk owning `position`.
    ///
    /// # Returns
    /// `false` if that chunk is not loaded; the edit is dropped.
    pub fn queue_edit(&mut self, position: Point3<i32>, block: Option<BlockType>) -> bool {
        let chunk_position = chunk_position_of(position);
        match self.chunks.get_mut(&chunk_position) {
            Some(chunk) => {
                chunk.queue_edit(position, block);
                true
            }
            None => {
                debug!(
                    "Dropped edit at {:?}: chunk {:?} is not loaded",
                    position, chunk_position
                );
                false
            }
        }
    }

    /// Queues removal of the first block along a ray.
    ///
    /// # Returns
    /// The voxel queued for removal, if the ray hit one
    pub fn pick_block(&mut self, eye: Point3<f32>, direction: Vector3<f32>) -> Option<Point3<i32>> {
        let hit = ray_cast(self, eye, direction);
        if !hit.found || !self.queue_edit(hit.position, None) {
            return None;
        }
        debug!("Picked block at {:?}", hit.position);
        Some(hit.position)
    }

    /// Queues `block` in the empty voxel in front of the first block along a ray.
    ///
    /// # Returns
    /// The voxel queued for placement, if the ray hit a block
    pub fn place_block(
        &mut self,
        eye: Point3<f32>,
        direction: Vector3<f32>,
        block: BlockType,
    ) -> Option<Point3<i32>> {
        let hit = ray_cast(self, eye, direction);
        if !hit.found || !self.queue_edit(hit.previous, Some(block)) {
            return None;
        }
        debug!("Placing {:?} at {:?}", block, hit.previous);
        Some(hit.previous)
    }

    /// Drains each chunk's edit queue under `budget`.
    ///
    /// # Returns
    /// The total number of edits applied
    pub fn process_queued_edits(&mut self, budget: Duration) -> Result<usize, MeshError> {
        let mut applied = 0;
        for chunk in self.chunks.values_mut() {
            applied += chunk.process_queued_edits(budget)?;
        }
        Ok(applied)
    }
}

impl VoxelGrid for World {
    fn is_occupied(&self, position: Point3<i32>) -> bool {
        self.chunk(chunk_position_of(position))
            .is_some_and(|chunk| chunk.has_block(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::memory_target::MemoryTarget, voxels::chunk::MAX_HEIGHT,
    };

    const GENEROUS: Duration = Duration::from_secs(60);

    fn world_with_origin_chunk() -> World {
        let mut world = World::new(42);
        world
            .load_chunk(Point2::new(0, 0), Box::new(MemoryTarget::default()))
            .unwrap();
        world
    }

    #[test]
    fn chunk_position_floors_negative_coordinates() {
        assert_eq!(chunk_position_of(Point3::new(0, 5, 15)), Point2::new(0, 0));
        assert_eq!(chunk_position_of(Point3::new(16, 0, -1)), Point2::new(1, -1));
        assert_eq!(chunk_position_of(Point3::new(-16, 0, -17)), Point2::new(-1, -2));
    }

    #[test]
    fn loading_twice_keeps_the_first_chunk() {
        let mut world = world_with_origin_chunk();
        let target = MemoryTarget::default();

        world
            .load_chunk(Point2::new(0, 0), Box::new(target.clone()))
            .unwrap();

        assert_eq!(world.chunks().count(), 1);
        assert_eq!(target.allocations(), 0);
    }

    #[test]
    fn edits_route_to_the_owning_chunk() {
        let mut world = world_with_origin_chunk();
        let above = Point3::new(3, MAX_HEIGHT * 2, 4);

        assert!(world.queue_edit(above, Some(BlockType::PLANKS)));
        assert!(!world.is_occupied(above));

        assert_eq!(world.process_queued_edits(GENEROUS).unwrap(), 1);
        assert_eq!(world.block_at(above), Some(BlockType::PLANKS));
        assert!(world.is_occupied(above));
    }

    #[test]
    fn edits_outside_loaded_chunks_are_dropped() {
        let mut world = world_with_origin_chunk();

        assert!(!world.queue_edit(Point3::new(-1, 10, 0), Some(BlockType::STONE)));
        assert_eq!(world.process_queued_edits(GENEROUS).unwrap(), 0);
        assert!(!world.is_occupied(Point3::new(-1, 10, 0)));
    }

    #[test]
    fn picking_and_placing_follow_the_ray() {
        let mut world = World::new(7);
        world.insert_chunk(crate::engine_state::voxels::chunk::tests::empty_chunk().0);
        world.queue_edit(Point3::new(5, 10, 5), Some(BlockType::STONE));
        world.process_queued_edits(GENEROUS).unwrap();

        let eye = Point3::new(5.5, 10.5, 0.5);
        let forward = Vector3::new(0.0, 0.0, 1.0);

        let placed = world.place_block(eye, forward, BlockType::GLASS);
        assert_eq!(placed, Some(Point3::new(5, 10, 4)));
        world.process_queued_edits(GENEROUS).unwrap();
        assert_eq!(world.block_at(Point3::new(5, 10, 4)), Some(BlockType::GLASS));

        assert_eq!(world.pick_block(eye, forward), Some(Point3::new(5, 10, 4)));
        world.process_queued_edits(GENEROUS).unwrap();
        assert_eq!(world.block_at(Point3::new(5, 10, 4)), None);

        assert_eq!(world.pick_block(eye, -forward), None);
    }

    #[test]
    fn generated_chunk_has_ground_below_max_height() {
        let world = world_with_origin_chunk();

        let solid = (0..CHUNK_SIZE as i32)
            .filter(|&x| world.is_occupied(Point3::new(x, 0, 0)))
            .count();
        assert!(solid > 0);
        assert!(!world.is_occupied(Point3::new(0, MAX_HEIGHT * 2, 0)));
    }
}
