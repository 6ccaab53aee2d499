//! # Block Type Module
//!
//! The catalog of placeable block kinds. Discriminants double as the block's index
//! into the registry, and the declaration order is the order the mouse wheel cycles
//! through when choosing a block to place.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Translucent liquid surface; never generated, only placed.
    WATER,

    /// Clear block, drawn with alpha blending.
    GLASS,

    /// Log with ring texture on the caps and bark on the sides.
    WOOD,

    /// Processed wood, same texture on every face.
    PLANKS,

    /// Fills the terrain below the dirt layer.
    STONE,

    /// Surface block near the water line.
    SAND,

    /// The three layers directly under the surface.
    DIRT,

    /// Surface block above the water line.
    /// Green top, grass-on-dirt sides and a plain dirt bottom.
    GRASS,
}

impl BlockType {
    /// Number of block types in the catalog.
    pub const COUNT: usize = 8;

    /// Looks up a block type by its registry index.
    ///
    /// # Returns
    /// `None` if `index` is outside the catalog
    pub fn from_index(index: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(index)
    }

    /// Returns this block's registry index.
    pub fn index(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns the block `steps` places after this one in the catalog, wrapping at
    /// both ends. Negative steps walk backwards.
    pub fn cycle(self, steps: i32) -> Self {
        let count = Self::COUNT as i32;
        let index = (self.index() as i32 + steps).rem_euclid(count);
        Self::from_index(index as BlockTypeSize).unwrap_or(self)
    }
}
