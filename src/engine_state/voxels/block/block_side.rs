//! # Block Side Module
//!
//! This module defines the six faces/sides of a voxel block and the rule that
//! decides which side, if any, a face definition points out of.

use cgmath::Vector3;
use num_derive::FromPrimitive;

use crate::engine_state::rendering::BlockVertex;

/// Coordinate a vertex must sit at, on some axis, for its face to lie on the block boundary.
pub const FACE_EXTREME: f32 = 0.5;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants follow the order in which a full cube lists its faces:
/// [RIGHT, LEFT, TOP, BOTTOM, FRONT, BACK], i.e. X+, X-, Y+, Y-, Z+, Z-.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The right face (facing positive X)
    RIGHT = 0,

    /// The left face (facing negative X)
    LEFT = 1,

    /// The top face (facing positive Y)
    TOP = 2,

    /// The bottom face (facing negative Y)
    BOTTOM = 3,

    /// The front face (facing positive Z)
    FRONT = 4,

    /// The back face (facing negative Z)
    BACK = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in cube order.
    ///
    /// The order is: [RIGHT, LEFT, TOP, BOTTOM, FRONT, BACK]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::RIGHT,
            BlockSide::LEFT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
            BlockSide::FRONT,
            BlockSide::BACK,
        ]
    }

    /// Converts a cube face index back into a side.
    ///
    /// # Returns
    /// `None` if `index` is 6 or more.
    pub fn from_index(index: usize) -> Option<Self> {
        num::FromPrimitive::from_usize(index)
    }

    /// The side on the given axis (0 = X, 1 = Y, 2 = Z) facing the positive or negative way.
    pub fn from_axis(axis: usize, positive: bool) -> Option<Self> {
        Self::from_index(axis * 2 + usize::from(!positive))
    }

    /// The axis this side is perpendicular to (0 = X, 1 = Y, 2 = Z).
    pub fn axis(self) -> usize {
        self as usize / 2
    }

    /// The integer grid step taken when leaving a block through this side.
    pub fn delta(self) -> Vector3<i32> {
        match self {
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
        }
    }

    /// The unit outward normal of this side.
    pub fn normal(self) -> [f32; 3] {
        let delta = self.delta();
        [delta.x as f32, delta.y as f32, delta.z as f32]
    }

    /// Lowercase name, as used for per-face keys in block tables.
    pub fn name(self) -> &'static str {
        match self {
            BlockSide::RIGHT => "right",
            BlockSide::LEFT => "left",
            BlockSide::TOP => "top",
            BlockSide::BOTTOM => "bottom",
            BlockSide::FRONT => "front",
            BlockSide::BACK => "back",
        }
    }

    /// The side facing the opposite way.
    pub fn opposite(self) -> Self {
        match self {
            BlockSide::RIGHT => BlockSide::LEFT,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
        }
    }
}

/// Which way a face definition points, as far as occlusion is concerned.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum FaceDirection {
    /// The face lies flat on this side of the block and can be hidden by a neighbor there.
    Directional(BlockSide),
    /// The face is not on the block boundary (e.g. a diagonal foliage quad); it is always drawn.
    NonDirectional,
}

impl FaceDirection {
    /// Infers the direction of a face from its block-local vertices.
    ///
    /// A face is directional when exactly one axis has every vertex at `+0.5`, or every
    /// vertex at `-0.5`. No vertices, no such axis, or more than one such axis gives
    /// [`FaceDirection::NonDirectional`].
    pub fn infer(vertices: &[BlockVertex]) -> Self {
        let Some(first) = vertices.first() else {
            return FaceDirection::NonDirectional;
        };

        let mut direction = FaceDirection::NonDirectional;
        for axis in 0..3 {
            let value = first.position[axis];
            if value != FACE_EXTREME && value != -FACE_EXTREME {
                continue;
            }
            if vertices.iter().any(|vertex| vertex.position[axis] != value) {
                continue;
            }
            if direction != FaceDirection::NonDirectional {
                // Flat on two axes at once: a degenerate face with no single outward side.
                return FaceDirection::NonDirectional;
            }
            if let Some(side) = BlockSide::from_axis(axis, value > 0.0) {
                direction = FaceDirection::Directional(side);
            }
        }

        direction
    }

    /// The side, for directional faces.
    pub fn side(self) -> Option<BlockSide> {
        match self {
            FaceDirection::Directional(side) => Some(side),
            FaceDirection::NonDirectional => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(positions: [[f32; 3]; 4]) -> Vec<BlockVertex> {
        positions
            .into_iter()
            .map(|position| BlockVertex::new(position, [0.0; 3], [0.0; 2]))
            .collect()
    }

    #[test]
    fn index_round_trip() {
        for (i, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, i);
            assert_eq!(BlockSide::from_index(i), Some(side));
            assert_eq!(BlockSide::from_axis(side.axis(), side.delta()[side.axis()] > 0), Some(side));
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.delta() + side.opposite().delta(), Vector3::new(0, 0, 0));
        }
        assert_eq!(BlockSide::from_index(6), None);
    }

    #[test]
    fn axis_aligned_faces_are_directional() {
        let positive_x = quad([
            [0.5, -0.5, 0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, 0.5],
            [0.5, 0.5, -0.5],
        ]);
        assert_eq!(
            FaceDirection::infer(&positive_x),
            FaceDirection::Directional(BlockSide::RIGHT)
        );

        let negative_y = quad([
            [0.5, -0.5, 0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, -0.5],
            [-0.5, -0.5, -0.5],
        ]);
        assert_eq!(
            FaceDirection::infer(&negative_y),
            FaceDirection::Directional(BlockSide::BOTTOM)
        );
    }

    #[test]
    fn diagonal_face_is_non_directional() {
        let diagonal = quad([
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, 0.5],
            [-0.5, 0.5, -0.5],
            [0.5, 0.5, 0.5],
        ]);
        assert_eq!(FaceDirection::infer(&diagonal), FaceDirection::NonDirectional);
    }

    #[test]
    fn inset_face_is_non_directional() {
        let inset = quad([
            [0.25, -0.5, 0.5],
            [0.25, -0.5, -0.5],
            [0.25, 0.5, 0.5],
            [0.25, 0.5, -0.5],
        ]);
        assert_eq!(FaceDirection::infer(&inset), FaceDirection::NonDirectional);
    }

    #[test]
    fn degenerate_and_empty_faces_are_non_directional() {
        let edge = quad([
            [0.5, 0.5, -0.5],
            [0.5, 0.5, 0.5],
            [0.5, 0.5, 0.0],
            [0.5, 0.5, 0.25],
        ]);
        assert_eq!(FaceDirection::infer(&edge), FaceDirection::NonDirectional);
        assert_eq!(FaceDirection::infer(&[]), FaceDirection::NonDirectional);
    }
}
