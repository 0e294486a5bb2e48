//! # Core Module
//!
//! Resource-sharing primitives used throughout the crate.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted resource with interior mutability
//!
//! The load phase (atlas allocation, catalog construction, grid population and meshing)
//! runs on one thread, so only the single-threaded variant exists.

pub mod st_resource;

pub use st_resource::StResource;
