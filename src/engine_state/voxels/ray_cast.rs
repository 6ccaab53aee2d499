//! Finding the voxel under the crosshair.
//!
//! The ray is marched in fixed steps of `1 / STEPS_PER_RAY_UNIT` blocks. Once a
//! step lands in an occupied voxel, the march backs up one step and repeats
//! with halved steps to tighten the hit point. The last empty position seen
//! during refinement is where a new block would be placed.

use cgmath::{InnerSpace, Point3, Vector3};

use super::VoxelGrid;

/// Furthest distance, in blocks, a ray travels.
pub const MAX_INTERACTION_DIST: u32 = 32;
/// Coarse march steps per block of distance.
pub const STEPS_PER_RAY_UNIT: u32 = 8;
/// Halving iterations after the first hit.
pub const RAY_CAST_REFINES: u32 = 8;

/// Outcome of [`ray_cast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Whether an occupied voxel was reached
    pub found: bool,
    /// Normalized ray direction
    pub direction: Vector3<f32>,
    /// The hit voxel, or the start voxel on a miss
    pub position: Point3<i32>,
    /// The empty voxel just before the hit, or the start voxel on a miss
    pub previous: Point3<i32>,
}

/// The voxel containing a point.
pub fn block_position(point: Point3<f32>) -> Point3<i32> {
    point.map(|c| c.floor() as i32)
}

/// Casts a ray from `start` along `direction` and reports the first occupied voxel.
///
/// A zero `direction` never hits anything.
pub fn ray_cast(grid: &impl VoxelGrid, start: Point3<f32>, direction: Vector3<f32>) -> RayHit {
    let miss = |direction| RayHit {
        found: false,
        direction,
        position: block_position(start),
        previous: block_position(start),
    };

    if direction.magnitude2() == 0.0 {
        return miss(direction);
    }
    let direction = direction.normalize();
    let mut step = 1.0 / STEPS_PER_RAY_UNIT as f32;

    let mut end = start;
    let mut refine_start = None;
    for _ in 0..MAX_INTERACTION_DIST * STEPS_PER_RAY_UNIT {
        end += direction * step;
        if grid.is_occupied(block_position(end)) {
            refine_start = Some(end - direction * step);
            break;
        }
    }

    let Some(refine_start) = refine_start else {
        return miss(direction);
    };

    step /= 2.0;
    let mut refine = refine_start;
    let mut previous = refine_start;
    for _ in 0..RAY_CAST_REFINES {
        refine += direction * step;
        if grid.is_occupied(block_position(refine)) {
            end = refine;
            refine -= direction * step;
            step /= 2.0;
        } else {
            previous = refine;
        }
    }

    RayHit {
        found: true,
        direction,
        position: block_position(end),
        previous: block_position(previous),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Voxels(HashSet<Point3<i32>>);

    impl VoxelGrid for Voxels {
        fn is_occupied(&self, position: Point3<i32>) -> bool {
            self.0.contains(&position)
        }
    }

    fn single(position: Point3<i32>) -> Voxels {
        Voxels(HashSet::from([position]))
    }

    #[test]
    fn hits_a_single_voxel_ahead() {
        let grid = single(Point3::new(0, 0, 5));

        let hit = ray_cast(&grid, Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 0.0, 1.0));

        assert!(hit.found);
        assert_eq!(hit.position, Point3::new(0, 0, 5));
        assert_eq!(hit.previous, Point3::new(0, 0, 4));
        assert_eq!(hit.direction, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn direction_is_normalized() {
        let grid = single(Point3::new(3, 0, 0));

        let hit = ray_cast(&grid, Point3::new(0.5, 0.5, 0.5), Vector3::new(10.0, 0.0, 0.0));

        assert!(hit.found);
        assert!((hit.direction.magnitude() - 1.0).abs() < 1e-6);
        assert_eq!(hit.previous, Point3::new(2, 0, 0));
    }

    #[test]
    fn empty_space_is_a_miss() {
        let grid = Voxels(HashSet::new());

        let hit = ray_cast(&grid, Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 1.0, 0.0));

        assert!(!hit.found);
        assert_eq!(hit.position, Point3::new(0, 0, 0));
    }

    #[test]
    fn voxels_beyond_reach_are_missed() {
        let grid = single(Point3::new(0, 0, MAX_INTERACTION_DIST as i32 + 2));

        let hit = ray_cast(&grid, Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 0.0, 1.0));

        assert!(!hit.found);
    }

    #[test]
    fn zero_direction_is_a_miss() {
        let grid = single(Point3::new(0, 0, 0));

        let hit = ray_cast(&grid, Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 0.0, 0.0));

        assert!(!hit.found);
    }

    #[test]
    fn looking_down_hits_the_floor_and_places_above_it() {
        let grid = Voxels((-2..=2).map(|x| Point3::new(x, 0, 0)).collect());

        let hit = ray_cast(&grid, Point3::new(0.5, 4.2, 0.5), Vector3::new(0.0, -1.0, 0.0));

        assert!(hit.found);
        assert_eq!(hit.position, Point3::new(0, 0, 0));
        assert_eq!(hit.previous, Point3::new(0, 1, 0));
    }

    #[test]
    fn negative_coordinates_floor_toward_negative_infinity() {
        assert_eq!(block_position(Point3::new(-0.1, 0.0, -1.0)), Point3::new(-1, 0, -1));
    }
}
