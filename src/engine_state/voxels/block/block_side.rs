//! # Block Side Module
//!
//! The six faces of a voxel together with the geometry tables the mesher and the
//! ambient occlusion pass read from: the unit-cube corners of each face, the
//! direction each face points in, and which faces border it on screen.

use cgmath::{Point3, Vector3};

/// Represents the six faces of a voxel block.
///
/// Discriminants index the per-face tables below and the per-face UV rects of the
/// block registry. The order is: [UP, DOWN, WEST, EAST, NORTH, SOUTH]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive Y
    UP = 0,

    /// Facing negative Y
    DOWN = 1,

    /// Facing negative X
    WEST = 2,

    /// Facing positive X
    EAST = 3,

    /// Facing negative Z
    NORTH = 4,

    /// Facing positive Z
    SOUTH = 5,
}

/// Unit-cube corners of each face, counter-clockwise when seen from outside.
const FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]],
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
    [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]],
    [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]],
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
];

const FACE_OFFSETS: [[i32; 3]; 6] = [
    [0, 1, 0],
    [0, -1, 0],
    [-1, 0, 0],
    [1, 0, 0],
    [0, 0, -1],
    [0, 0, 1],
];

/// For each face: the faces lying above, below, left and right of it, in the
/// face's own texture space.
const FACE_NEIGHBORS: [[usize; 4]; 6] = [
    [4, 5, 2, 3],
    [5, 4, 2, 3],
    [0, 1, 4, 5],
    [0, 1, 5, 4],
    [0, 1, 3, 2],
    [0, 1, 2, 3],
];

/// The four faces bordering a face, as returned by [`BlockSide::neighbors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceNeighbors {
    pub up: BlockSide,
    pub down: BlockSide,
    pub left: BlockSide,
    pub right: BlockSide,
}

impl BlockSide {
    /// Returns all six block faces in table order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::UP,
            BlockSide::DOWN,
            BlockSide::WEST,
            BlockSide::EAST,
            BlockSide::NORTH,
            BlockSide::SOUTH,
        ]
    }

    /// Converts a table index back into a face.
    ///
    /// # Returns
    /// `None` for indices outside `0..6`
    pub fn from_index(index: usize) -> Option<BlockSide> {
        Self::all().get(index).copied()
    }

    /// Unit vector pointing out of this face.
    pub fn offset(self) -> Vector3<i32> {
        FACE_OFFSETS[self as usize].into()
    }

    /// The face's four corners placed on the block at `position`.
    pub fn corners(self, position: Point3<i32>) -> [Point3<f32>; 4] {
        FACE_CORNERS[self as usize].map(|[x, y, z]| {
            Point3::new(
                (position.x + x) as f32,
                (position.y + y) as f32,
                (position.z + z) as f32,
            )
        })
    }

    /// The faces bordering this one, used to find the blocks that shade its corners.
    pub fn neighbors(self) -> FaceNeighbors {
        let [up, down, left, right] = FACE_NEIGHBORS[self as usize];
        let all = Self::all();
        FaceNeighbors {
            up: all[up],
            down: all[down],
            left: all[left],
            right: all[right],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn corners_wind_counter_clockwise_around_the_outward_normal() {
        for side in BlockSide::all() {
            let [a, b, c, _] = side.corners(Point3::new(0, 0, 0));
            let normal = (b - a).cross(c - a).normalize();
            let offset = side.offset();
            let expected = Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32);
            assert!((normal - expected).magnitude() < 1e-6, "{:?}", side);
        }
    }

    #[test]
    fn neighbors_are_perpendicular_to_the_face() {
        for side in BlockSide::all() {
            let n = side.neighbors();
            for neighbor in [n.up, n.down, n.left, n.right] {
                let (a, b) = (neighbor.offset(), side.offset());
                assert_eq!(a.x * b.x + a.y * b.y + a.z * b.z, 0);
            }
            assert_eq!(n.up.offset() + n.down.offset(), Vector3::new(0, 0, 0));
            assert_eq!(n.left.offset() + n.right.offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn from_index_matches_discriminants() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_index(side as usize), Some(side));
        }
        assert_eq!(BlockSide::from_index(6), None);
    }
}
