//! Rendering-side data for the voxel engine.
//!
//! This module contains everything that ends up on the GPU: the streaming texture
//! atlas block faces sample from, the vertex format of block faces, and the mesh
//! builder that turns a voxel grid into vertex and index buffers.

pub mod atlas;
pub mod meshing;
pub mod texture;
mod vertex;

// Re-export commonly used types
pub use vertex::BlockVertex;
