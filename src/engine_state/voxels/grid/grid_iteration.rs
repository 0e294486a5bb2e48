//! # Grid Iteration Module
//!
//! Walks the occupied slots of a [`VoxelGrid`] in storage order, skipping empty ones.

use std::{iter::Enumerate, slice::Iter};

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::VoxelGrid;

/// An iterator over all occupied slots of a grid.
///
/// Yields `(index, position, block)` where `index` is the flat storage index and
/// `position` the world position of the slot. Slots come out in ascending index order.
pub struct OccupiedSlots<'a> {
    /// The grid being walked, for index to position conversion
    grid: &'a VoxelGrid,
    /// Remaining slots
    slots: Enumerate<Iter<'a, Option<Block>>>,
}

impl<'a> OccupiedSlots<'a> {
    /// Creates an iterator positioned at the first slot of `grid`.
    pub fn new(grid: &'a VoxelGrid) -> Self {
        OccupiedSlots {
            grid,
            slots: grid.slots().iter().enumerate(),
        }
    }
}

impl<'a> Iterator for OccupiedSlots<'a> {
    type Item = (usize, Point3<i32>, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let grid = self.grid;
        self.slots.find_map(|(index, slot)| {
            slot.as_ref()
                .map(|block| (index, grid.position_of(index), block))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.slots.size_hint().1)
    }
}
