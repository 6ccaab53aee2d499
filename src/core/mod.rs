//! # Core Module
//!
//! Shared-ownership primitives used throughout the sandbox.
//!
//! ## Key Components
//! - `StSystem`: Single-threaded, reference-counted container with interior mutability,
//!   used for the GPU device, the queue and the buffer registry

pub mod st_system;

pub use st_system::StSystem;
