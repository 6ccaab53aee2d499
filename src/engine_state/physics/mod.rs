//! # Physics
//!
//! Axis-aligned boxes that fall, move and push out of each other.
//!
//! Integration is explicit Euler at whatever rate frames arrive, but a step is
//! only taken when the frame is shorter than one tick (`1 / TICKS_PER_SECOND`).
//! Longer frames (startup, window drags, debugger pauses) leave boxes where they
//! are rather than tunnelling them through the ground.

use cgmath::Vector3;

pub mod aabb;

pub use aabb::{Aabb, DEBUG_BOX_LINE_INDICES};

/// Physics rate; frames slower than one tick skip integration.
pub const TICKS_PER_SECOND: u32 = 120;

/// Default acceleration of active boxes, in blocks per second squared.
pub const GRAVITY: Vector3<f32> = Vector3::new(0.0, -24.0, 0.0);

/// Length of one tick in seconds.
pub fn tick_seconds() -> f32 {
    1.0 / TICKS_PER_SECOND as f32
}
