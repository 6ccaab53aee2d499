#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Sandbox
//!
//! A small first-person voxel sandbox built with Rust and WGPU: one procedurally
//! generated chunk, ambient-occluded block meshes, box collision and block editing.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, GPU initialization, input and the frame loop
//! * `core` - Shared-ownership primitives used throughout the engine
//! * `engine_state` - Terrain, chunks, meshing, physics, the player and rendering
//! * `settings` - Runtime configuration read from `assets/settings.json`
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_sandbox::run()
//! }
//! ```
//!
//! Controls: Escape captures the mouse, WASD moves, Space jumps, left Control
//! sprints, left and right click break and place, the wheel picks a block and F3
//! outlines the player's boxes.

use anyhow::Context;
use application_state::ApplicationState;
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
mod core;
mod engine_state;
pub mod settings;

/// Initializes logging, loads settings and runs the event loop until the window closes.
///
/// # Errors
/// Fails if the event loop cannot be created or exits with an error.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let settings = settings::Settings::load_or_default();

    let event_loop = EventLoop::with_user_event()
        .build()
        .context("failed to create event loop")?;

    let mut state = ApplicationState::new(event_loop.create_proxy(), settings);

    event_loop
        .run_app(&mut state)
        .context("event loop exited with an error")
}
