//! # Chunk Creation Module
//!
//! Fills a chunk with terrain from a [`TerrainGenerator`].
//!
//! Each column gets a height from the fractal and biome layers. Voxels from
//! bedrock up to that height survive only where cave noise clears the threshold.
//! The block type depends on the depth below the surface:
//!
//! | depth | block |
//! |---|---|
//! | surface | sand near the water line, grass above it |
//! | 1 to 3 below | dirt |
//! | deeper | stone |

use cgmath::Point3;
use log::info;
use web_time::Instant;

use crate::engine_state::{
    rendering::meshing::MeshError,
    voxels::{
        block::block_type::BlockType,
        terrain::{TerrainGenerator, WATER_LEVEL},
    },
};

use super::{Chunk, CHUNK_SIZE};

/// Number of dirt layers between the surface block and stone.
const DIRT_DEPTH: i32 = 3;

/// Picks the block for height `y` in a column whose surface is at `height`.
pub fn layer_block(y: i32, height: i32) -> BlockType {
    if y == height {
        if y < WATER_LEVEL + 2 {
            BlockType::SAND
        } else {
            BlockType::GRASS
        }
    } else if y >= height - DIRT_DEPTH {
        BlockType::DIRT
    } else {
        BlockType::STONE
    }
}

impl Chunk {
    /// Replaces the chunk's contents with terrain for `seed` and rebuilds the mesh.
    ///
    /// Pending edits are kept and apply on top of the new terrain.
    pub fn generate(&mut self, seed: u32) -> Result<(), MeshError> {
        let start = Instant::now();
        let generator = TerrainGenerator::new(seed);
        let origin = self.world_origin();

        self.seed = seed;
        self.blocks.clear();

        for local_x in 0..CHUNK_SIZE as i32 {
            for local_z in 0..CHUNK_SIZE as i32 {
                let (x, z) = (origin.x + local_x, origin.z + local_z);
                let height = generator.height(x as f64, z as f64);

                for y in 0..=height {
                    if generator.is_solid(x as f64, y as f64, z as f64) {
                        self.blocks
                            .insert(Point3::new(x, y, z), layer_block(y, height));
                    }
                }
            }
        }

        self.rebuild_mesh()?;

        info!(
            "Generated chunk {:?} with seed {}: {} blocks, {} indices in {:?}",
            self.position,
            seed,
            self.blocks.len(),
            self.mesh.draw_length(),
            start.elapsed()
        );
        Ok(())
    }
}
