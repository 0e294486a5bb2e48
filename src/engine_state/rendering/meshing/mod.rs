//! Mesh generation for voxel rendering.
//!
//! This module handles the conversion of a voxel grid into one GPU-friendly triangle
//! list and the upload of that list into vertex and index buffers.
//!
//! # Architecture
//! - `mesh`: the visibility-culled mesh builder
//! - `buffers`: GPU buffer creation for a built mesh

mod buffers;
mod mesh;

pub use buffers::{MeshBuffers, BLOCKS_INDEX_BUFFER, BLOCKS_VERTEX_BUFFER};
pub use mesh::{is_face_occluded, BlocksMesh};
