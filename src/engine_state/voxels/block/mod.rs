//! # Block Module
//!
//! The block registry: an immutable catalog mapping every [`BlockType`] to the
//! texture-atlas rectangles of its six faces and to its opacity.
//!
//! ## Texture Atlas
//!
//! Block textures live in a single 4x4 tile atlas. Tile `(x, y)` counts from the
//! bottom-left corner of the image, because the atlas is flipped vertically on load.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types.
pub type BlockTypeSize = u8;

/// Four texture coordinates, one `(u, v)` pair per face corner, in the same
/// order as the corners returned by [`BlockSide::corners`].
pub type UvRect = [f32; 8];

/// Number of tiles along each side of the atlas.
pub const ATLAS_TILES_PER_SIDE: u32 = 4;

/// Atlas tiles per block as `[top, side, bottom]`, indexed by `BlockType`.
const BLOCK_TILES: [[(u32, u32); 3]; BlockType::COUNT] = [
    [(2, 0), (2, 0), (2, 0)], // WATER
    [(3, 0), (3, 0), (3, 0)], // GLASS
    [(1, 2), (0, 2), (1, 2)], // WOOD
    [(2, 2), (2, 2), (2, 2)], // PLANKS
    [(0, 0), (0, 0), (0, 0)], // STONE
    [(1, 0), (1, 0), (1, 0)], // SAND
    [(0, 1), (0, 1), (0, 1)], // DIRT
    [(2, 1), (1, 1), (0, 1)], // GRASS
];

/// Builds the UV rectangle for one atlas tile.
pub fn tile_uv_rect(x: u32, y: u32) -> UvRect {
    let k = 1.0 / ATLAS_TILES_PER_SIDE as f32;
    let (u, v) = (x as f32 * k, y as f32 * k);
    [u, v, u + k, v, u + k, v + k, u, v + k]
}

impl BlockType {
    /// Returns the UV rect of every face, in [`BlockSide`] order.
    pub fn face_uvs(self) -> [UvRect; 6] {
        let [top, side, bottom] = BLOCK_TILES[self as usize];
        let top = tile_uv_rect(top.0, top.1);
        let side = tile_uv_rect(side.0, side.1);
        let bottom = tile_uv_rect(bottom.0, bottom.1);
        [top, bottom, side, side, side, side]
    }

    /// Returns the UV rect of a single face.
    pub fn face_uv(self, side: BlockSide) -> UvRect {
        self.face_uvs()[side as usize]
    }

    /// Whether the block fully hides whatever is behind it.
    ///
    /// Clear blocks (glass, water) are drawn but never cull their neighbors' faces.
    pub fn is_opaque(self) -> bool {
        !matches!(self, BlockType::WATER | BlockType::GLASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_uses_distinct_top_side_and_bottom_tiles() {
        let uvs = BlockType::GRASS.face_uvs();

        assert_eq!(uvs[BlockSide::UP as usize], tile_uv_rect(2, 1));
        assert_eq!(uvs[BlockSide::DOWN as usize], tile_uv_rect(0, 1));
        for side in [BlockSide::WEST, BlockSide::EAST, BlockSide::NORTH, BlockSide::SOUTH] {
            assert_eq!(BlockType::GRASS.face_uv(side), tile_uv_rect(1, 1));
        }
    }

    #[test]
    fn tile_rect_spans_one_quarter_of_the_atlas() {
        assert_eq!(
            tile_uv_rect(1, 2),
            [0.25, 0.5, 0.5, 0.5, 0.5, 0.75, 0.25, 0.75]
        );
    }

    #[test]
    fn only_glass_and_water_are_clear() {
        let clear: Vec<_> = (0..BlockType::COUNT as BlockTypeSize)
            .filter_map(BlockType::from_index)
            .filter(|block_type| !block_type.is_opaque())
            .collect();

        assert_eq!(clear, vec![BlockType::WATER, BlockType::GLASS]);
    }
}
