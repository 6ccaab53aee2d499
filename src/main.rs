//! # Voxel Sandbox Entry Point
//!
//! Calls into the library's `run()`. Run from the repository root so the
//! `assets/` directory is found.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release
//! ```

fn main() -> anyhow::Result<()> {
    voxel_sandbox::run()
}
