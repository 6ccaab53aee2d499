//! Mesh construction for a single chunk.
//!
//! Every visible face becomes one quad of four [`Vertex`] values. A face is
//! visible unless the neighbor it points at occludes it, and each corner is
//! darkened by the occluders around it (classic voxel ambient occlusion).
//!
//! Occlusion depends on the block being meshed: a clear block (glass, water) is
//! occluded by any neighbor, so water never shows internal faces, while an opaque
//! block is only occluded by opaque neighbors. Lookups never leave the chunk;
//! faces on the chunk border are always drawn.

use cgmath::Point3;
use web_time::Instant;

use crate::engine_state::{
    rendering::{meshing::MeshError, vertex::Vertex},
    voxels::block::block_side::BlockSide,
};

use super::Chunk;

/// Brightness removed per occluder at a face corner.
pub const AO_CLIPPING_STRENGTH: f32 = 0.125;

/// Occlusion level of one corner, from 0 (open) to 3 (fully enclosed).
///
/// Two side occluders fully enclose the corner whatever the diagonal holds.
pub fn vertex_ambient_occlusion(side1: bool, side2: bool, corner: bool) -> u8 {
    if side1 && side2 {
        return 3;
    }
    side1 as u8 + side2 as u8 + corner as u8
}

impl Chunk {
    /// Rebuilds the mesh from the committed voxels.
    pub(super) fn rebuild_mesh(&mut self) -> Result<(), MeshError> {
        let start = Instant::now();
        let mut vertices = Vec::new();

        for (&position, &block) in &self.blocks {
            for side in BlockSide::all() {
                if !self.is_face_visible(position, side) {
                    continue;
                }

                let corners = side.corners(position);
                let brightness = self.ambient_occlusion(position, side);
                let uvs = block.face_uv(side);

                vertices.extend((0..4).map(|i| Vertex {
                    position: corners[i].into(),
                    brightness: brightness[i],
                    tex_coords: [uvs[i * 2], uvs[i * 2 + 1]],
                }));
            }
        }

        self.mesh.reset()?;
        self.mesh.append(bytemuck::cast_slice(&vertices))?;

        log::trace!(
            "Meshed chunk {:?}: {} quads in {:?}",
            self.position,
            vertices.len() / 4,
            start.elapsed()
        );
        Ok(())
    }

    /// Whether the face of the block at `position` facing `side` is drawn.
    ///
    /// Air positions have no faces.
    pub fn is_face_visible(&self, position: Point3<i32>, side: BlockSide) -> bool {
        let Some(block) = self.block_at(position) else {
            return false;
        };
        !self.occludes(position + side.offset(), !block.is_opaque())
    }

    /// Brightness of the four corners of a face, in corner order
    /// (bottom-left, bottom-right, top-right, top-left).
    pub fn ambient_occlusion(&self, position: Point3<i32>, side: BlockSide) -> [f32; 4] {
        let base_clear = self
            .block_at(position)
            .is_some_and(|block| !block.is_opaque());
        let open = position + side.offset();
        let n = side.neighbors();

        let check = |faces: &[BlockSide]| {
            let target = faces.iter().fold(open, |p, face| p + face.offset());
            self.occludes(target, base_clear)
        };

        let (up, down) = (check(&[n.up]), check(&[n.down]));
        let (left, right) = (check(&[n.left]), check(&[n.right]));
        let up_left = check(&[n.up, n.left]);
        let up_right = check(&[n.up, n.right]);
        let down_left = check(&[n.down, n.left]);
        let down_right = check(&[n.down, n.right]);

        [
            vertex_ambient_occlusion(down, left, down_left),
            vertex_ambient_occlusion(right, down, down_right),
            vertex_ambient_occlusion(up, right, up_right),
            vertex_ambient_occlusion(left, up, up_left),
        ]
        .map(|level| 1.0 - level as f32 * AO_CLIPPING_STRENGTH)
    }

    fn occludes(&self, position: Point3<i32>, base_clear: bool) -> bool {
        match self.block_at(position) {
            Some(_) if base_clear => true,
            Some(block) => block.is_opaque(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::meshing::{memory_target::MemoryTarget, FLOATS_PER_VERTEX, INDICES_PER_FACE},
        voxels::{block::block_type::BlockType, chunk::tests::empty_chunk},
    };
    use web_time::Duration;

    const GENEROUS: Duration = Duration::from_secs(60);

    fn chunk_with(blocks: &[(Point3<i32>, BlockType)]) -> (Chunk, MemoryTarget) {
        let (mut chunk, target) = empty_chunk();
        for &(position, block) in blocks {
            chunk.queue_edit(position, Some(block));
        }
        chunk.process_queued_edits(GENEROUS).unwrap();
        (chunk, target)
    }

    #[test]
    fn occlusion_levels() {
        assert_eq!(vertex_ambient_occlusion(false, false, false), 0);
        assert_eq!(vertex_ambient_occlusion(false, false, true), 1);
        assert_eq!(vertex_ambient_occlusion(true, false, true), 2);
        assert_eq!(vertex_ambient_occlusion(true, true, false), 3);
        assert_eq!(vertex_ambient_occlusion(true, true, true), 3);
    }

    #[test]
    fn lone_block_draws_all_faces_unshaded() {
        let origin = Point3::new(0, 0, 0);
        let (chunk, target) = chunk_with(&[(origin, BlockType::STONE)]);

        for side in BlockSide::all() {
            assert!(chunk.is_face_visible(origin, side));
            assert_eq!(chunk.ambient_occlusion(origin, side), [1.0; 4]);
        }
        assert_eq!(chunk.mesh().draw_length() as usize, 6 * INDICES_PER_FACE);
        assert_eq!(target.vertices().len(), 24 * FLOATS_PER_VERTEX);
    }

    #[test]
    fn corner_shading_follows_neighbors() {
        let origin = Point3::new(0, 0, 0);
        let (chunk, _) = chunk_with(&[
            (origin, BlockType::STONE),
            (Point3::new(0, 1, 1), BlockType::STONE),
            (Point3::new(-1, 1, 0), BlockType::STONE),
        ]);

        assert_eq!(
            chunk.ambient_occlusion(origin, BlockSide::UP),
            [0.625, 0.875, 1.0, 0.875]
        );
    }

    #[test]
    fn corners_match_neighbor_directions() {
        // corner i sits toward the neighbor pair used to shade it
        for side in BlockSide::all() {
            let n = side.neighbors();
            let pairs = [(n.down, n.left), (n.right, n.down), (n.up, n.right), (n.left, n.up)];
            let corners = side.corners(Point3::new(0, 0, 0));

            for (corner, (a, b)) in corners.iter().zip(pairs) {
                for face in [a, b] {
                    let o = face.offset();
                    let toward = o.x as f32 * (corner.x * 2.0 - 1.0)
                        + o.y as f32 * (corner.y * 2.0 - 1.0)
                        + o.z as f32 * (corner.z * 2.0 - 1.0);
                    assert_eq!(toward, 1.0, "{:?} corner {:?}", side, corner);
                }
            }
        }
    }

    #[test]
    fn clear_neighbors_do_not_cull_opaque_faces() {
        let stone = Point3::new(0, 0, 0);
        let glass = Point3::new(1, 0, 0);
        let (chunk, _) = chunk_with(&[(stone, BlockType::STONE), (glass, BlockType::GLASS)]);

        assert!(chunk.is_face_visible(stone, BlockSide::EAST));
        assert!(!chunk.is_face_visible(glass, BlockSide::WEST));
    }

    #[test]
    fn adjacent_water_hides_shared_faces() {
        let a = Point3::new(0, 0, 0);
        let b = Point3::new(0, 0, 1);
        let (chunk, _) = chunk_with(&[(a, BlockType::WATER), (b, BlockType::WATER)]);

        assert!(!chunk.is_face_visible(a, BlockSide::SOUTH));
        assert!(!chunk.is_face_visible(b, BlockSide::NORTH));
        assert_eq!(chunk.mesh().draw_length() as usize, 10 * INDICES_PER_FACE);
    }

    #[test]
    fn clear_blocks_are_shaded_by_any_neighbor() {
        let origin = Point3::new(0, 0, 0);
        let (glass, _) = chunk_with(&[
            (origin, BlockType::GLASS),
            (Point3::new(1, 1, 0), BlockType::GLASS),
        ]);
        let (stone, _) = chunk_with(&[
            (origin, BlockType::STONE),
            (Point3::new(1, 1, 0), BlockType::GLASS),
        ]);

        assert_eq!(glass.ambient_occlusion(origin, BlockSide::UP), [1.0, 0.875, 0.875, 1.0]);
        assert_eq!(stone.ambient_occlusion(origin, BlockSide::UP), [1.0; 4]);
    }

    #[test]
    fn air_has_no_visible_faces() {
        let (chunk, _) = empty_chunk();

        assert!(!chunk.is_face_visible(Point3::new(0, 0, 0), BlockSide::UP));
    }

    #[test]
    fn vertices_carry_atlas_coordinates() {
        let origin = Point3::new(0, 0, 0);
        let (_, target) = chunk_with(&[(origin, BlockType::SAND)]);
        let floats = target.vertices();
        let vertices: &[Vertex] = bytemuck::cast_slice(&floats);
        let uv = BlockType::SAND.face_uv(BlockSide::UP);

        for vertex in vertices {
            assert!(vertex.tex_coords[0] >= uv[0] && vertex.tex_coords[0] <= uv[2]);
            assert!(vertex.tex_coords[1] >= uv[1] && vertex.tex_coords[1] <= uv[5]);
        }
    }
}
