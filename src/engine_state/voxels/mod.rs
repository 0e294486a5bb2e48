//! # Voxel Engine Core
//!
//! This module contains the voxel data of the engine: what kinds of blocks exist and
//! where they are placed.
//!
//! ## Architecture
//!
//! * **Block**: Block sides, block types with their face geometry, and the catalog
//!   that owns every type
//! * **Grid**: A bounded 3D array of block slots, its iteration and scene generation
//!
//! Grid slots hold a small `Block` value naming a catalog entry, so placing a block
//! never copies face geometry. The catalog must outlive every grid meshed against it.

pub mod block;
pub mod grid;
