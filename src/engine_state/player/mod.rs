//! # Player Controller
//!
//! A first-person player built from two boxes:
//!
//! * the **physics box**, a unit cube around the eyes that carries velocity and
//!   gravity, and
//! * the **collision box**, a narrow body-sized box hanging below the eyes that
//!   is pushed out of the voxels it overlaps.
//!
//! Each update moves the physics box, hangs the collision box from it, resolves
//! the collision box against the world and finally puts the camera on top of
//! the resolved body. Resolution is order dependent: blocks are visited x-major,
//! then z, then y, and every correction is applied before the next block is tested.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{
    camera_state::camera::Camera,
    physics::Aabb,
    voxels::{ray_cast::block_position, VoxelGrid},
};

mod movement_input;

pub use movement_input::MovementInput;

/// Eye height above the bottom of the collision box.
pub const PLAYER_HEIGHT: f32 = 1.7;
/// Width and depth of the collision box.
pub const PLAYER_COLLISION_WIDTH: f32 = 0.6;
/// Height of the collision box.
pub const PLAYER_COLLISION_HEIGHT: f32 = 1.5;
/// Upward velocity of a jump, in blocks per second.
pub const JUMP_POWER: f32 = 8.0;
/// Walking speed, in blocks per second.
pub const MOVEMENT_SPEED: f32 = 4.3;
/// Forward speed multiplier while sprinting.
pub const SPRINT_SPEED: f32 = 1.6;
/// Share of last frame's horizontal velocity carried into the next one.
pub const COLLISION_DAMPING: f32 = 0.05;

const COLLISION_BOX_COLOR: Vector3<f32> = Vector3::new(1.0, 1.0, 0.0);
const PHYSICS_BOX_COLOR: Vector3<f32> = Vector3::new(1.0, 0.0, 0.0);

/// Offset from the eyes down to the center of the collision box.
fn body_offset() -> Vector3<f32> {
    Vector3::new(0.0, PLAYER_HEIGHT - PLAYER_COLLISION_HEIGHT / 2.0, 0.0)
}

pub struct Player {
    pub camera: Camera,
    pub collision_box: Aabb,
    pub physics_box: Aabb,
    pub input: MovementInput,
}

impl Player {
    /// Creates a player whose eyes are at the camera position.
    pub fn new(camera: Camera) -> Self {
        let collision_box = Aabb::new(
            camera.position - body_offset(),
            Vector3::new(
                PLAYER_COLLISION_WIDTH,
                PLAYER_COLLISION_HEIGHT,
                PLAYER_COLLISION_WIDTH,
            ),
        )
        .with_debug_color(COLLISION_BOX_COLOR);

        let mut physics_box = Aabb::new(camera.position, Vector3::new(1.0, 1.0, 1.0))
            .with_debug_color(PHYSICS_BOX_COLOR);
        physics_box.active = true;

        Self {
            camera,
            collision_box,
            physics_box,
            input: MovementInput::default(),
        }
    }

    /// Turns the view by a mouse movement.
    pub fn look(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        self.camera.rotate(delta_x, delta_y, sensitivity);
    }

    /// Advances the player by `dt` seconds against `grid`.
    pub fn update(&mut self, dt: f32, grid: &impl VoxelGrid) {
        self.update_physics(dt);
        self.collision_box
            .set_center(self.physics_box.center() - body_offset());
        self.collide_with(grid);
        self.sync_camera();
    }

    /// Turns held keys into velocity and integrates the physics box.
    fn update_physics(&mut self, dt: f32) {
        let velocity = self.physics_box.velocity;
        let mut motion = Vector3::new(
            velocity.x * COLLISION_DAMPING,
            0.0,
            velocity.z * COLLISION_DAMPING,
        );

        let front = self.camera.front();
        let flat_front = Vector3::new(front.x, 0.0, front.z).normalize();
        let right = self.camera.right();

        if self.input.forward {
            let multiplier = if self.input.sprint { SPRINT_SPEED } else { 1.0 };
            motion += flat_front * multiplier;
        } else {
            self.input.sprint = false;
        }
        if self.input.backward {
            motion -= flat_front;
        }
        if self.input.left {
            motion -= right;
        }
        if self.input.right {
            motion += right;
        }
        if motion.magnitude2() > 0.0 {
            motion *= MOVEMENT_SPEED;
        }

        if self.input.jump && self.physics_box.velocity.y == 0.0 {
            self.physics_box.velocity.y = JUMP_POWER;
        }

        self.physics_box.velocity.x = motion.x;
        self.physics_box.velocity.z = motion.z;
        self.physics_box.update(dt);
    }

    /// Pushes the collision box out of every occupied voxel it overlaps.
    ///
    /// Candidate voxels are gathered from the box's position before any
    /// correction is applied.
    pub fn collide_with(&mut self, grid: &impl VoxelGrid) {
        let dimensions = self.collision_box.dimensions;
        let origin = self.collision_box.position;
        let range = |extent: f32| -1..(extent + 1.0).ceil() as i32;

        let mut candidates = Vec::new();
        for x in range(dimensions.x) {
            for z in range(dimensions.z) {
                for y in range(dimensions.y) {
                    let offset = Vector3::new(x as f32, y as f32, z as f32);
                    candidates.push(block_position(origin + offset));
                }
            }
        }

        for block in candidates {
            if !grid.is_occupied(block) {
                continue;
            }

            let collision = self.collision_box.overlap(&Aabb::block(block));
            if !collision.colliding {
                continue;
            }

            self.collision_box.translate(collision.correction);
            self.sync_camera();
            self.physics_box.set_center(self.camera.position);
            self.physics_box.velocity[collision.collision_axis] = 0.0;
            if collision.collision_axis != 1 {
                self.input.sprint = false;
            }
        }
    }

    /// Puts the eyes on top of the collision box.
    fn sync_camera(&mut self) {
        let center = self.collision_box.center();
        self.camera.position = Point3::new(
            center.x,
            self.collision_box.position.y + PLAYER_HEIGHT,
            center.z,
        );
    }

    /// Boxes drawn by the debug pass.
    pub fn debug_boxes(&self) -> [&Aabb; 2] {
        [&self.collision_box, &self.physics_box]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cgmath::Deg;

    use super::*;

    struct Voxels(HashSet<Point3<i32>>);

    impl VoxelGrid for Voxels {
        fn is_occupied(&self, position: Point3<i32>) -> bool {
            self.0.contains(&position)
        }
    }

    const DT: f32 = 0.005;

    fn floor() -> Voxels {
        let mut blocks = HashSet::new();
        for x in -4..=4 {
            for z in -4..=4 {
                blocks.insert(Point3::new(x, 0, z));
            }
        }
        Voxels(blocks)
    }

    /// A player looking along +X at `(x, y, z)`.
    fn player_at(x: f32, y: f32, z: f32) -> Player {
        Player::new(Camera::new(Point3::new(x, y, z), Deg(-90.0), Deg(0.0)))
    }

    fn run(player: &mut Player, grid: &Voxels, ticks: usize) {
        for _ in 0..ticks {
            player.update(DT, grid);
        }
    }

    #[test]
    fn boxes_start_around_the_eyes() {
        let player = player_at(0.5, 10.0, 0.5);

        assert_eq!(player.physics_box.center(), Point3::new(0.5, 10.0, 0.5));
        assert!((player.collision_box.position.y - (10.0 - PLAYER_HEIGHT)).abs() < 1e-5);
        assert!(player.physics_box.active);
        assert!(player.debug_boxes().iter().all(|b| b.debug_color.is_some()));
    }

    #[test]
    fn falls_and_lands_on_the_floor() {
        let grid = floor();
        let mut player = player_at(0.5, 5.0, 0.5);

        run(&mut player, &grid, 1000);

        assert!((player.collision_box.position.y - 1.0).abs() < 0.01);
        assert!((player.camera.position.y - (1.0 + PLAYER_HEIGHT)).abs() < 0.01);
        assert!((player.camera.position.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn long_frames_do_not_move_the_player() {
        let grid = floor();
        let mut player = player_at(0.5, 5.0, 0.5);

        run(&mut player, &grid, 1);
        let position = player.camera.position;
        player.update(0.5, &grid);

        assert!((player.camera.position - position).magnitude() < 1e-5);
    }

    #[test]
    fn walls_stop_forward_motion_and_sprinting() {
        let mut grid = floor();
        for z in -4..=4 {
            for y in 1..=3 {
                grid.0.insert(Point3::new(2, y, z));
            }
        }
        let mut player = player_at(0.5, 3.0, 0.5);
        run(&mut player, &grid, 200);

        player.input.forward = true;
        player.input.sprint = true;
        run(&mut player, &grid, 400);

        let half_width = PLAYER_COLLISION_WIDTH / 2.0;
        assert!(player.camera.position.x <= 2.0 - half_width + 1e-3);
        assert!(player.camera.position.x > 1.5);
        assert!(!player.input.sprint);
    }

    #[test]
    fn releasing_forward_cancels_sprint() {
        let mut player = player_at(0.5, 50.0, 0.5);
        player.input.sprint = true;

        player.update(DT, &Voxels(HashSet::new()));

        assert!(!player.input.sprint);
    }

    #[test]
    fn jumping_requires_zero_vertical_velocity() {
        let grid = floor();
        let mut player = player_at(0.5, 30.0, 0.5);
        run(&mut player, &grid, 10);

        player.input.jump = true;
        player.update(DT, &grid);
        assert!(player.physics_box.velocity.y < 0.0);

        player.input.jump = false;
        run(&mut player, &grid, 2000);
        let mut settle = 0;
        while player.physics_box.velocity.y != 0.0 && settle < 10 {
            player.update(DT, &grid);
            settle += 1;
        }
        assert_eq!(player.physics_box.velocity.y, 0.0);

        player.input.jump = true;
        player.update(DT, &grid);
        assert!(player.physics_box.velocity.y > JUMP_POWER - 1.0);
        assert!(player.camera.position.y > 1.0 + PLAYER_HEIGHT);
    }
}
