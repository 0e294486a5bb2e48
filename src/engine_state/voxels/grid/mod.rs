//! # Voxel Grid Module
//!
//! A bounded, dense 3D array of optional blocks placed somewhere in world space.
//!
//! ## Addressing
//!
//! The grid covers the world positions `base..base + size` on every axis. Slots are stored
//! flat, Y-major then Z then X:
//!
//! ```text
//! index = y * size.x * size.z + z * size.x + x
//! ```
//!
//! where `(x, y, z)` is the position relative to `base`. The mapping is a bijection
//! between in-range positions and `0..len()`.
//!
//! ## Access
//!
//! Two kinds of access are provided:
//! - checked: [`VoxelGrid::at`], [`VoxelGrid::at_mut`], [`VoxelGrid::set`] and friends
//!   return [`GridError::OutOfRange`] for positions outside the grid
//! - probing: [`VoxelGrid::get`] folds "outside the grid" and "empty slot" into `None`,
//!   which is exactly what neighbor tests during meshing need

use cgmath::{Point3, Vector3};

use crate::error::{GridError, GridResult};

use super::block::Block;

pub mod grid_generation;
pub mod grid_iteration;

pub use grid_generation::{GridGenerator, ScenePalette};
pub use grid_iteration::OccupiedSlots;

/// A bounded 3D array of optional blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    /// World position of slot (0, 0, 0)
    base: Point3<i32>,
    /// Number of slots along each axis
    size: Vector3<usize>,
    /// Flat slot storage, see the module docs for the ordering
    slots: Vec<Option<Block>>,
}

impl VoxelGrid {
    /// Creates an empty grid.
    ///
    /// # Arguments
    /// * `base` - World position of the first slot
    /// * `size` - Number of slots along each axis; a zero dimension gives a grid with no slots
    ///
    /// # Errors
    /// `GridError::InvalidSize` if the slot count overflows `usize` or a slot would have
    /// a world position outside the `i32` range.
    pub fn new(base: Point3<i32>, size: Vector3<usize>) -> GridResult<Self> {
        let invalid = || GridError::InvalidSize {
            base: [base.x, base.y, base.z],
            size: [size.x, size.y, size.z],
        };

        let len = size
            .x
            .checked_mul(size.z)
            .and_then(|plane| plane.checked_mul(size.y))
            .ok_or_else(invalid)?;
        for (start, extent) in [(base.x, size.x), (base.y, size.y), (base.z, size.z)] {
            let Some(last) = extent.checked_sub(1) else {
                continue;
            };
            let fits = i64::try_from(last)
                .ok()
                .and_then(|last| i64::from(start).checked_add(last))
                .is_some_and(|end| end <= i64::from(i32::MAX));
            if !fits {
                return Err(invalid());
            }
        }

        Ok(Self {
            base,
            size,
            slots: vec![None; len],
        })
    }

    /// World position of the first slot.
    pub fn base(&self) -> Point3<i32> {
        self.base
    }

    /// Number of slots along each axis.
    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the grid has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `position` addresses a slot.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.storage_location(position).is_some()
    }

    /// Flat index of the slot at `position`, or `None` outside the grid.
    pub fn storage_location(&self, position: Point3<i32>) -> Option<usize> {
        let relative = [
            i64::from(position.x) - i64::from(self.base.x),
            i64::from(position.y) - i64::from(self.base.y),
            i64::from(position.z) - i64::from(self.base.z),
        ];
        let size = [self.size.x, self.size.y, self.size.z];

        let mut local = [0usize; 3];
        for axis in 0..3 {
            let offset = usize::try_from(relative[axis]).ok()?;
            if offset >= size[axis] {
                return None;
            }
            local[axis] = offset;
        }

        Some(local[1] * self.size.x * self.size.z + local[2] * self.size.x + local[0])
    }

    /// Flat index of the slot at `position`.
    ///
    /// # Errors
    /// `GridError::OutOfRange` if `position` is outside the grid.
    pub fn calculate_storage_location(&self, position: Point3<i32>) -> GridResult<usize> {
        self.storage_location(position)
            .ok_or_else(|| out_of_range(position))
    }

    /// World position of the slot at flat index `index`.
    ///
    /// This is the exact inverse of [`calculate_storage_location`](Self::calculate_storage_location).
    ///
    /// # Errors
    /// `GridError::IndexOutOfRange` if `index >= len()`.
    pub fn calculate_position(&self, index: usize) -> GridResult<Point3<i32>> {
        if index >= self.slots.len() {
            return Err(GridError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(self.position_of(index))
    }

    /// Inverse mapping for an index already known to be in range.
    ///
    /// `new` guarantees every slot has an `i32` position, so the additions cannot overflow.
    pub(crate) fn position_of(&self, index: usize) -> Point3<i32> {
        let plane = self.size.x * self.size.z;
        let y = index / plane;
        let z = (index % plane) / self.size.x;
        let x = index % self.size.x;

        Point3::new(
            self.base.x + x as i32,
            self.base.y + y as i32,
            self.base.z + z as i32,
        )
    }

    /// The slot at `position`.
    ///
    /// # Errors
    /// `GridError::OutOfRange` if `position` is outside the grid.
    pub fn at(&self, position: Point3<i32>) -> GridResult<&Option<Block>> {
        let index = self.calculate_storage_location(position)?;
        Ok(&self.slots[index])
    }

    /// The slot at `position`, for assignment.
    ///
    /// # Errors
    /// `GridError::OutOfRange` if `position` is outside the grid.
    pub fn at_mut(&mut self, position: Point3<i32>) -> GridResult<&mut Option<Block>> {
        let index = self.calculate_storage_location(position)?;
        Ok(&mut self.slots[index])
    }

    /// The block at `position`, or `None` when the slot is empty or outside the grid.
    pub fn get(&self, position: Point3<i32>) -> Option<&Block> {
        self.storage_location(position)
            .and_then(|index| self.slots[index].as_ref())
    }

    /// Places `block` at `position` and returns what was there.
    ///
    /// # Errors
    /// `GridError::OutOfRange` if `position` is outside the grid.
    pub fn set(&mut self, position: Point3<i32>, block: Block) -> GridResult<Option<Block>> {
        Ok(self.at_mut(position)?.replace(block))
    }

    /// Empties the slot at `position` and returns what was there.
    ///
    /// # Errors
    /// `GridError::OutOfRange` if `position` is outside the grid.
    pub fn clear(&mut self, position: Point3<i32>) -> GridResult<Option<Block>> {
        Ok(self.at_mut(position)?.take())
    }

    /// Fills the box spanned by two corners, both inclusive, with `block`.
    ///
    /// The corners may be given in any order. Nothing is written unless the whole
    /// box is inside the grid.
    ///
    /// # Returns
    /// The number of slots written.
    ///
    /// # Errors
    /// `GridError::OutOfRange` naming the first corner outside the grid.
    pub fn fill(&mut self, from: Point3<i32>, to: Point3<i32>, block: Block) -> GridResult<usize> {
        let min = Point3::new(from.x.min(to.x), from.y.min(to.y), from.z.min(to.z));
        let max = Point3::new(from.x.max(to.x), from.y.max(to.y), from.z.max(to.z));
        self.calculate_storage_location(min)?;
        self.calculate_storage_location(max)?;

        let mut written = 0;
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    if let Some(index) = self.storage_location(Point3::new(x, y, z)) {
                        self.slots[index] = Some(block);
                        written += 1;
                    }
                }
            }
        }
        Ok(written)
    }

    /// Empties every slot.
    pub fn clear_all(&mut self) {
        self.slots.fill(None);
    }

    /// Iterates over occupied slots in storage order.
    pub fn occupied(&self) -> OccupiedSlots<'_> {
        OccupiedSlots::new(self)
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Raw slot storage, in storage order.
    pub fn slots(&self) -> &[Option<Block>] {
        &self.slots
    }
}

fn out_of_range(position: Point3<i32>) -> GridError {
    GridError::OutOfRange {
        x: position.x,
        y: position.y,
        z: position.z,
    }
}

#[cfg(test)]
mod tests {
    use crate::engine_state::voxels::block::BlockTypeId;

    use super::*;

    fn block(id: u16) -> Block {
        Block::new(BlockTypeId(id))
    }

    #[test]
    fn storage_order_is_y_then_z_then_x() {
        let grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(3, 4, 5)).unwrap();

        assert_eq!(grid.len(), 60);
        assert_eq!(grid.storage_location(Point3::new(1, 0, 0)), Some(1));
        assert_eq!(grid.storage_location(Point3::new(0, 0, 1)), Some(3));
        assert_eq!(grid.storage_location(Point3::new(0, 1, 0)), Some(15));
        assert_eq!(grid.storage_location(Point3::new(2, 3, 4)), Some(59));
    }

    #[test]
    fn base_offset_is_subtracted() {
        let grid = VoxelGrid::new(Point3::new(-2, 10, 5), Vector3::new(2, 2, 2)).unwrap();

        assert_eq!(grid.storage_location(Point3::new(-2, 10, 5)), Some(0));
        assert_eq!(grid.calculate_position(7).unwrap(), Point3::new(-1, 11, 6));
        assert!(!grid.contains(Point3::new(0, 10, 5)));
        assert!(!grid.contains(Point3::new(-3, 10, 5)));
    }

    #[test]
    fn checked_and_probing_access_disagree_only_on_range() {
        let mut grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(2, 2, 2)).unwrap();
        let outside = Point3::new(0, 2, 0);
        let empty = Point3::new(1, 1, 1);

        assert_eq!(grid.get(outside), None);
        assert_eq!(grid.get(empty), None);
        assert_eq!(grid.at(empty), Ok(&None));
        assert_eq!(grid.at(outside), Err(GridError::OutOfRange { x: 0, y: 2, z: 0 }));
        assert_eq!(grid.set(outside, block(0)), Err(GridError::OutOfRange { x: 0, y: 2, z: 0 }));

        assert_eq!(grid.set(empty, block(1)), Ok(None));
        assert_eq!(grid.get(empty), Some(&block(1)));
        assert_eq!(grid.set(empty, block(2)), Ok(Some(block(1))));
        assert_eq!(grid.clear(empty), Ok(Some(block(2))));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn index_past_the_end_is_rejected() {
        let grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(2, 2, 2)).unwrap();
        assert_eq!(
            grid.calculate_position(8),
            Err(GridError::IndexOutOfRange { index: 8, len: 8 })
        );
    }

    #[test]
    fn fill_is_all_or_nothing() {
        let mut grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(4, 4, 4)).unwrap();

        assert_eq!(
            grid.fill(Point3::new(1, 1, 1), Point3::new(2, 4, 2), block(0)),
            Err(GridError::OutOfRange { x: 2, y: 4, z: 2 })
        );
        assert_eq!(grid.occupied_count(), 0);

        assert_eq!(grid.fill(Point3::new(2, 1, 2), Point3::new(1, 0, 1), block(0)), Ok(8));
        assert_eq!(grid.occupied_count(), 8);
        assert!(grid.get(Point3::new(1, 0, 1)).is_some());
        assert!(grid.get(Point3::new(3, 0, 1)).is_none());
    }

    #[test]
    fn zero_sized_grid_is_permanently_empty() {
        let mut grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(4, 0, 4)).unwrap();

        assert!(grid.is_empty());
        assert_eq!(grid.get(Point3::new(0, 0, 0)), None);
        assert!(grid.set(Point3::new(0, 0, 0), block(0)).is_err());
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn grid_reaching_the_edge_of_i32_round_trips() {
        let base = Point3::new(i32::MAX - 2, i32::MIN, 0);
        let mut grid = VoxelGrid::new(base, Vector3::new(3, 1, 2)).unwrap();

        for index in 0..grid.len() {
            let position = grid.calculate_position(index).unwrap();
            assert_eq!(grid.calculate_storage_location(position), Ok(index));
        }
        assert_eq!(
            grid.calculate_position(2),
            Ok(Point3::new(i32::MAX, i32::MIN, 0))
        );

        grid.generate(
            &super::GridGenerator::Checkerboard,
            &super::ScenePalette {
                surface: block(0),
                filler: block(1),
                decoration: None,
            },
        );
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn grid_past_the_edge_of_i32_is_rejected() {
        let base = Point3::new(i32::MAX - 1, 0, 0);

        assert_eq!(
            VoxelGrid::new(base, Vector3::new(3, 1, 1)),
            Err(GridError::InvalidSize {
                base: [i32::MAX - 1, 0, 0],
                size: [3, 1, 1],
            })
        );
        assert!(VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(usize::MAX, 2, 1)).is_err());
        assert!(VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(usize::MAX, 0, 2)).is_err());
    }
}
