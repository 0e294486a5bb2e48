//! Visibility-culled mesh building.
//!
//! Turns a [`VoxelGrid`] into one flat triangle list holding only the faces that can
//! be seen. Every occupied slot is visited once, in storage order, and each face of its
//! block type is either dropped (hidden by an opaque neighbor) or appended as-is,
//! translated to the slot position. Adjacent faces are never merged or shared.

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

use crate::{
    engine_state::{
        rendering::BlockVertex,
        voxels::{
            block::{
                block_side::{BlockSide, FaceDirection},
                block_type::{BlockFace, BlockType},
                catalog::BlockCatalog,
            },
            grid::VoxelGrid,
        },
    },
    error::{MeshError, MeshResult},
};

/// A triangle mesh of the visible block faces of a grid.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BlocksMesh {
    /// World-space vertices
    pub vertices: Vec<BlockVertex>,
    /// Triangle list into `vertices`
    pub indices: Vec<u32>,
    /// Number of faces emitted
    pub faces: usize,
}

impl BlocksMesh {
    /// Builds the mesh of every visible face in `grid`.
    ///
    /// A face of an opaque block is skipped when it lies on a block side and the
    /// neighboring slot on that side holds an opaque block. Faces of transparent blocks,
    /// faces on the grid boundary, faces next to empty or transparent slots, and faces
    /// with no side are always emitted.
    ///
    /// # Arguments
    /// * `grid` - The blocks to mesh
    /// * `catalog` - The catalog the grid's block type ids refer to
    ///
    /// # Errors
    /// * `MeshError::UnknownBlockType` if a slot refers to a type missing from `catalog`
    /// * `MeshError::IndexOverflow` if the mesh needs more than `u32` indices can address
    ///
    /// No mesh is returned when an error occurs.
    pub fn build(grid: &VoxelGrid, catalog: &BlockCatalog) -> MeshResult<Self> {
        let start = Instant::now();
        let mut mesh = BlocksMesh::default();
        let mut culled = 0usize;

        for (index, position, block) in grid.occupied() {
            let block_type =
                catalog
                    .get(block.block_type)
                    .ok_or(MeshError::UnknownBlockType {
                        index,
                        block_type: block.block_type.0,
                    })?;
            let offset = [position.x as f32, position.y as f32, position.z as f32];

            for face in block_type.faces() {
                if is_face_occluded(grid, catalog, position, block_type, face) {
                    culled += 1;
                    continue;
                }
                mesh.add_face(face, offset)?;
            }
        }

        debug!("Culled {} hidden faces", culled);
        info!(
            "Built block mesh: {} faces, {} vertices, {} indices in {:?}",
            mesh.faces,
            mesh.vertices.len(),
            mesh.indices.len(),
            start.elapsed()
        );
        Ok(mesh)
    }

    /// Appends a face moved by `offset`.
    ///
    /// The face's indices are local to its own vertex list, so they are shifted by the
    /// number of vertices already in the mesh.
    pub fn add_face(&mut self, face: &BlockFace, offset: [f32; 3]) -> MeshResult<()> {
        let face_vertices = face.vertices();
        let total = self.vertices.len() + face_vertices.len();
        if total > 0 && u32::try_from(total - 1).is_err() {
            return Err(MeshError::IndexOverflow);
        }
        index_count(self.indices.len() + face.indices().len())?;
        let current_vertices_len = self.vertices.len() as u32;

        self.vertices
            .extend(face_vertices.iter().map(|vertex| vertex.translated(offset)));
        self.indices
            .extend(face.indices().iter().map(|index| index + current_vertices_len));
        self.faces += 1;
        Ok(())
    }

    /// Whether no face was emitted.
    pub fn is_empty(&self) -> bool {
        self.faces == 0
    }

    /// Number of triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Number of indices as a `u32` draw count.
pub(crate) fn index_count(len: usize) -> MeshResult<u32> {
    u32::try_from(len).map_err(|_| MeshError::IndexOverflow)
}

/// Decides whether `face` of the block at `position` is hidden.
///
/// Only faces of an opaque `block_type` with an inferred side can be hidden. They are
/// hidden exactly when the neighboring slot on that side is occupied by a block whose
/// type is opaque too. Out-of-range neighbors count as empty.
pub fn is_face_occluded(
    grid: &VoxelGrid,
    catalog: &BlockCatalog,
    position: Point3<i32>,
    block_type: &BlockType,
    face: &BlockFace,
) -> bool {
    if block_type.is_transparent() {
        return false;
    }
    let FaceDirection::Directional(side) = face.direction() else {
        return false;
    };

    neighbor(position, side)
        .and_then(|neighbor| grid.get(neighbor))
        .and_then(|block| catalog.get(block.block_type))
        .is_some_and(|block_type| !block_type.is_transparent())
}

/// The position one step through `side`, unless it leaves the `i32` range.
fn neighbor(position: Point3<i32>, side: BlockSide) -> Option<Point3<i32>> {
    let delta = side.delta();
    Some(Point3::new(
        position.x.checked_add(delta.x)?,
        position.y.checked_add(delta.y)?,
        position.z.checked_add(delta.z)?,
    ))
}
