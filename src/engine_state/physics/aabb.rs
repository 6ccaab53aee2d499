//! Axis-aligned bounding boxes and minimum-translation collision resolution.

use cgmath::{EuclideanSpace, Point3, Vector3};

use super::{tick_seconds, GRAVITY};
use crate::engine_state::rendering::vertex::DebugVertex;

/// Extra distance added to every correction so resolved boxes stop touching.
const COLLISION_DELTA: f32 = 0.001;

/// Line-list indices of a box's twelve edges, four per face:
/// front, back, left, right, top, bottom.
pub const DEBUG_BOX_LINE_INDICES: [u32; 48] = [
    0, 1, 1, 2, 2, 3, 3, 0, // front
    4, 5, 5, 6, 6, 7, 7, 4, // back
    4, 0, 0, 3, 3, 7, 7, 4, // left
    1, 5, 5, 6, 6, 2, 2, 1, // right
    3, 2, 2, 6, 6, 7, 7, 3, // top
    0, 1, 1, 5, 5, 4, 4, 0, // bottom
];

/// An axis-aligned box, optionally simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub position: Point3<f32>,
    /// Size along each axis; never negative
    pub dimensions: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
    /// Only active boxes integrate in [`Aabb::update`]
    pub active: bool,
    /// Color of the wireframe drawn when debug boxes are shown; `None` hides it
    pub debug_color: Option<Vector3<f32>>,
}

/// Result of comparing two boxes with [`Aabb::overlap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    pub colliding: bool,
    /// Per-axis push needed to move the first box in the positive direction
    pub overlap1: Vector3<f32>,
    /// Per-axis push needed to move the first box in the negative direction
    pub overlap2: Vector3<f32>,
    /// Smallest push that separates the boxes, non-zero on one axis only
    pub correction: Vector3<f32>,
    /// Index of the axis `correction` acts on
    pub collision_axis: usize,
}

impl CollisionData {
    fn resolve(colliding: bool, overlap1: Vector3<f32>, overlap2: Vector3<f32>) -> Self {
        let mut best = (0, overlap1[0].abs(), true);
        for (first, overlaps) in [(true, overlap1), (false, overlap2)] {
            for axis in 0..3 {
                let magnitude = overlaps[axis].abs();
                // strict comparison keeps the earliest candidate, so set 1 wins ties
                if magnitude < best.1 {
                    best = (axis, magnitude, first);
                }
            }
        }

        let (collision_axis, _, first) = best;
        let mut correction = Vector3::new(0.0, 0.0, 0.0);
        correction[collision_axis] = if first {
            overlap1[collision_axis] + COLLISION_DELTA
        } else {
            -(overlap2[collision_axis] + COLLISION_DELTA)
        };

        CollisionData {
            colliding,
            overlap1,
            overlap2,
            correction,
            collision_axis,
        }
    }
}

impl Aabb {
    /// Creates an inactive box centered on `center`.
    pub fn new(center: Point3<f32>, dimensions: Vector3<f32>) -> Self {
        Self::from_corner(center - dimensions / 2.0, dimensions)
    }

    /// Creates an inactive box from its minimum corner.
    pub fn from_corner(position: Point3<f32>, dimensions: Vector3<f32>) -> Self {
        Aabb {
            position,
            dimensions,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            acceleration: GRAVITY,
            active: false,
            debug_color: None,
        }
    }

    /// The unit box occupying voxel `block`.
    pub fn block(block: Point3<i32>) -> Self {
        let corner = Point3::new(block.x as f32, block.y as f32, block.z as f32);
        Self::from_corner(corner, Vector3::new(1.0, 1.0, 1.0))
    }

    pub fn with_debug_color(mut self, color: Vector3<f32>) -> Self {
        self.debug_color = Some(color);
        self
    }

    pub fn center(&self) -> Point3<f32> {
        self.position + self.dimensions / 2.0
    }

    /// Moves the box so it is centered on `center`.
    pub fn set_center(&mut self, center: Point3<f32>) {
        self.position = center - self.dimensions / 2.0;
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
    }

    /// Compares this box against `other`.
    ///
    /// The boxes collide only when they overlap on every axis; touching faces do
    /// not count. The correction moves `self` out of `other` along the axis of
    /// least penetration.
    pub fn overlap(&self, other: &Aabb) -> CollisionData {
        let overlap1 = other.dimensions - self.position.to_vec() + other.position.to_vec();
        let overlap2 = self.dimensions - other.position.to_vec() + self.position.to_vec();

        let colliding = (0..3).all(|axis| overlap1[axis] > 0.0 && overlap2[axis] > 0.0);
        CollisionData::resolve(colliding, overlap1, overlap2)
    }

    /// Advances an active box by `dt` seconds.
    ///
    /// Frames of a tick or longer are skipped entirely.
    pub fn update(&mut self, dt: f32) {
        if !self.active || dt >= tick_seconds() {
            return;
        }
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Wireframe corners in world space, to be drawn with [`DEBUG_BOX_LINE_INDICES`].
    ///
    /// # Returns
    /// `None` when the box has no debug color
    pub fn debug_vertices(&self) -> Option<[DebugVertex; 8]> {
        let color: [f32; 3] = self.debug_color?.into();
        let (x, y, z) = (0.0, 0.0, 0.0);
        let Vector3 {
            x: dx,
            y: dy,
            z: dz,
        } = self.dimensions;
        let corners = [
            [x, y, z],
            [dx, y, z],
            [dx, dy, z],
            [x, dy, z],
            [x, y, dz],
            [dx, y, dz],
            [dx, dy, dz],
            [x, dy, dz],
        ];

        Some(corners.map(|[cx, cy, cz]| DebugVertex {
            position: [
                self.position.x + cx,
                self.position.y + cy,
                self.position.z + cz,
            ],
            color,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::physics::TICKS_PER_SECOND;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (0..3).all(|axis| (a[axis] - b[axis]).abs() < 1e-5)
    }

    #[test]
    fn center_round_trips_through_position() {
        let mut aabb = Aabb::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 4.0, 1.0));

        assert_eq!(aabb.position, Point3::new(0.0, 0.0, 2.5));
        assert_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));

        aabb.set_center(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.position, Point3::new(-1.0, -2.0, -0.5));
        assert_eq!(aabb.dimensions, Vector3::new(2.0, 4.0, 1.0));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Aabb::from_corner(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let b = Aabb::from_corner(Point3::new(0.5, 0.25, -0.5), Vector3::new(1.0, 2.0, 1.0));
        let c = Aabb::from_corner(Point3::new(3.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        assert!(a.overlap(&b).colliding);
        assert!(b.overlap(&a).colliding);
        assert!(!a.overlap(&c).colliding);
        assert!(!c.overlap(&a).colliding);
    }

    #[test]
    fn separated_and_touching_boxes_do_not_collide() {
        let a = Aabb::from_corner(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let apart = Aabb::from_corner(Point3::new(0.0, 5.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let touching = Aabb::from_corner(Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        assert!(!a.overlap(&apart).colliding);
        assert!(!a.overlap(&touching).colliding);
    }

    #[test]
    fn shallow_overlap_on_x_is_corrected_on_x() {
        let a = Aabb::from_corner(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let from_right = Aabb::from_corner(Point3::new(0.7, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let from_left = Aabb::from_corner(Point3::new(-0.7, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));

        let pushed_left = a.overlap(&from_right);
        assert!(pushed_left.colliding);
        assert_eq!(pushed_left.collision_axis, 0);
        assert!(approx(pushed_left.correction, Vector3::new(-0.301, 0.0, 0.0)));

        let pushed_right = a.overlap(&from_left);
        assert!(pushed_right.colliding);
        assert_eq!(pushed_right.collision_axis, 0);
        assert!(approx(pushed_right.correction, Vector3::new(0.301, 0.0, 0.0)));
    }

    #[test]
    fn applying_the_correction_separates_the_boxes() {
        let mut a = Aabb::from_corner(Point3::new(0.2, 0.9, 0.1), Vector3::new(0.6, 1.5, 0.6));
        let floor = Aabb::block(Point3::new(0, 0, 0));

        let data = a.overlap(&floor);
        assert!(data.colliding);
        assert_eq!(data.collision_axis, 1);

        a.translate(data.correction);
        assert!(!a.overlap(&floor).colliding);
        assert!((a.position.y - 1.001).abs() < 1e-5);
    }

    #[test]
    fn update_integrates_only_active_boxes_on_short_frames() {
        let mut aabb = Aabb::new(Point3::new(0.0, 10.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let start = aabb.position;

        aabb.update(0.005);
        assert_eq!(aabb.position, start);

        aabb.active = true;
        aabb.update(1.0 / TICKS_PER_SECOND as f32);
        aabb.update(0.5);
        assert_eq!(aabb.position, start);
        assert_eq!(aabb.velocity, Vector3::new(0.0, 0.0, 0.0));

        aabb.update(0.005);
        assert!(approx(aabb.velocity, GRAVITY * 0.005));
        assert!(aabb.position.y < start.y);
    }

    #[test]
    fn debug_vertices_follow_the_box() {
        let plain = Aabb::from_corner(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 2.0, 1.0));
        assert!(plain.debug_vertices().is_none());

        let vertices = plain
            .with_debug_color(Vector3::new(1.0, 0.0, 0.0))
            .debug_vertices()
            .unwrap();
        assert_eq!(vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(vertices[6].position, [2.0, 4.0, 4.0]);
        assert!(vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0]));
        assert!(DEBUG_BOX_LINE_INDICES.iter().all(|&i| i < 8));
    }
}
