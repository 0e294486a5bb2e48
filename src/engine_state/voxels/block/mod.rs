//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the catalog that owns
//! every block type, and the lightweight block value stored in grid slots.

pub mod block_side;
pub mod block_type;
pub mod catalog;

/// Index of a block type inside its [`catalog::BlockCatalog`].
///
/// Ids are handed out by the catalog in registration order and are only meaningful
/// for the catalog that issued them.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockTypeId(pub u16);

impl BlockTypeId {
    /// Position of the type in the catalog.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the essential block data.
/// The actual block properties are looked up from the block type in the catalog,
/// so placing a block never copies its geometry.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout.
/// The block type is stored as a compact 16-bit catalog index.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// The type of this block.
    pub block_type: BlockTypeId,
}

impl Block {
    /// Creates a new block of the specified type.
    ///
    /// # Arguments
    /// * `block_type` - The catalog id of the block's type
    ///
    /// # Returns
    /// A new `Block` instance with the specified type.
    pub fn new(block_type: BlockTypeId) -> Self {
        Block { block_type }
    }
}
