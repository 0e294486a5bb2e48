//! # Block Type Module
//!
//! This module defines what a kind of block looks like: its faces, the geometry of
//! each face, and which texture each face samples. Block types are immutable once
//! built and are shared by every grid slot holding that type.

use std::rc::Rc;

use crate::{
    engine_state::rendering::{atlas::AtlasCell, BlockVertex},
    error::{CatalogError, CatalogResult},
};

use super::block_side::{BlockSide, FaceDirection};

/// Triangle winding for a quad whose vertices are listed bottom-left,
/// bottom-right, top-left, top-right.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

/// Back-facing winding for the same quad vertex order.
const QUAD_INDICES_REVERSED: [u32; 6] = [0, 2, 1, 1, 2, 3];

/// Vertices of the six unit-cube faces, in the order X+, X-, Y+, Y-, Z+, Z-.
pub const CUBE_FACE_VERTICES: [[BlockVertex; 4]; 6] = [
    // X+
    [
        BlockVertex::new([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
        BlockVertex::new([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
        BlockVertex::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
        BlockVertex::new([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
    ],
    // X-
    [
        BlockVertex::new([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        BlockVertex::new([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        BlockVertex::new([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        BlockVertex::new([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    ],
    // Y+
    [
        BlockVertex::new([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
        BlockVertex::new([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
        BlockVertex::new([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
        BlockVertex::new([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
    ],
    // Y-
    [
        BlockVertex::new([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
        BlockVertex::new([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
        BlockVertex::new([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
        BlockVertex::new([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
    ],
    // Z+
    [
        BlockVertex::new([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
        BlockVertex::new([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
        BlockVertex::new([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
        BlockVertex::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
    ],
    // Z-
    [
        BlockVertex::new([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
        BlockVertex::new([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
        BlockVertex::new([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
        BlockVertex::new([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
    ],
];

/// Where a face takes its texels from.
#[derive(Clone, Debug)]
pub enum FaceTexture {
    /// A cell of the streaming atlas. The handle is shared by every face using the texture.
    Atlas(Rc<AtlasCell>),
    /// A whole texture bound on its own, identified by the renderer's slot number.
    /// Texture coordinates stay face-local.
    Direct(u32),
}

impl FaceTexture {
    /// The atlas cell, for atlas-backed faces.
    pub fn cell(&self) -> Option<&AtlasCell> {
        match self {
            FaceTexture::Atlas(cell) => Some(cell),
            FaceTexture::Direct(_) => None,
        }
    }
}

/// One planar side of a block: its geometry, winding and texture.
///
/// Vertices are stored ready for meshing. Their texture coordinates are already in
/// atlas space and carry the atlas cell, so the mesh builder only translates positions.
#[derive(Clone, Debug)]
pub struct BlockFace {
    vertices: Vec<BlockVertex>,
    indices: Vec<u32>,
    texture: FaceTexture,
    direction: FaceDirection,
}

impl BlockFace {
    /// Defines a face from block-local vertices with face-local texture coordinates.
    ///
    /// # Arguments
    /// * `vertices` - Face vertices in block-local space, UVs in `[0, 1]²`
    /// * `indices` - Triangle list referencing `vertices`
    /// * `texture` - The texture the face samples
    ///
    /// # Errors
    /// * `CatalogError::InvalidTriangleList` if `indices` is not a multiple of 3 long
    /// * `CatalogError::InvalidFaceIndex` if an index does not reference a vertex
    pub fn new(
        vertices: Vec<BlockVertex>,
        indices: Vec<u32>,
        texture: FaceTexture,
    ) -> CatalogResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(CatalogError::InvalidTriangleList(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(CatalogError::InvalidFaceIndex {
                index,
                vertex_count: vertices.len(),
            });
        }

        Ok(Self::assemble(vertices, indices, texture))
    }

    /// Builds a face from trusted geometry: remaps UVs into the atlas, stamps the
    /// cell coordinate on every vertex and caches the inferred direction.
    fn assemble(mut vertices: Vec<BlockVertex>, indices: Vec<u32>, texture: FaceTexture) -> Self {
        if let Some(cell) = texture.cell() {
            for vertex in &mut vertices {
                vertex.uv = cell.remap_uv(vertex.uv);
                vertex.cell = [cell.x(), cell.y()];
            }
        }
        let direction = FaceDirection::infer(&vertices);

        Self {
            vertices,
            indices,
            texture,
            direction,
        }
    }

    /// Block-local vertices with final texture coordinates.
    pub fn vertices(&self) -> &[BlockVertex] {
        &self.vertices
    }

    /// Triangle list into [`vertices`](Self::vertices).
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The texture the face samples.
    pub fn texture(&self) -> &FaceTexture {
        &self.texture
    }

    /// The side the face can be occluded from, if any.
    pub fn direction(&self) -> FaceDirection {
        self.direction
    }
}

/// Per-type properties that affect meshing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockTypeAttributes {
    /// Neighbors can be seen through this block, so it never hides their faces.
    pub transparent: bool,
}

/// A kind of block: string id, attributes and face list.
#[derive(Clone, Debug)]
pub struct BlockType {
    id: String,
    attributes: BlockTypeAttributes,
    faces: Vec<BlockFace>,
}

impl BlockType {
    /// Creates a full unit cube.
    ///
    /// # Arguments
    /// * `id` - Unique string id of the type
    /// * `attributes` - Meshing properties
    /// * `textures` - One texture per face, in the order X+, X-, Y+, Y-, Z+, Z-
    ///   (see [`BlockSide::all`])
    pub fn cube(
        id: impl Into<String>,
        attributes: BlockTypeAttributes,
        textures: [FaceTexture; 6],
    ) -> Self {
        let faces = CUBE_FACE_VERTICES
            .iter()
            .zip(textures)
            .map(|(vertices, texture)| {
                BlockFace::assemble(vertices.to_vec(), QUAD_INDICES.to_vec(), texture)
            })
            .collect();

        Self::custom(id, attributes, faces)
    }

    /// Creates a cross-shaped block: two quads through the block diagonals, each
    /// drawn from both sides. None of its faces lie on the block boundary, so they
    /// are never culled.
    pub fn cross(id: impl Into<String>, attributes: BlockTypeAttributes, texture: FaceTexture) -> Self {
        let diagonals = [
            ([-0.5, -0.5], [0.5, 0.5]),
            ([-0.5, 0.5], [0.5, -0.5]),
        ];
        let inv_sqrt_2 = std::f32::consts::FRAC_1_SQRT_2;

        let mut faces = Vec::with_capacity(4);
        for (start, end) in diagonals {
            // perpendicular to the diagonal in the XZ plane
            let normal = [
                (end[1] - start[1]) * inv_sqrt_2,
                0.0,
                -(end[0] - start[0]) * inv_sqrt_2,
            ];
            for (normal, indices) in [
                (normal, QUAD_INDICES),
                ([-normal[0], 0.0, -normal[2]], QUAD_INDICES_REVERSED),
            ] {
                let vertices = vec![
                    BlockVertex::new([start[0], -0.5, start[1]], normal, [0.0, 0.0]),
                    BlockVertex::new([end[0], -0.5, end[1]], normal, [1.0, 0.0]),
                    BlockVertex::new([start[0], 0.5, start[1]], normal, [0.0, 1.0]),
                    BlockVertex::new([end[0], 0.5, end[1]], normal, [1.0, 1.0]),
                ];
                faces.push(BlockFace::assemble(vertices, indices.to_vec(), texture.clone()));
            }
        }

        Self::custom(id, attributes, faces)
    }

    /// Creates a block type from arbitrary faces.
    pub fn custom(id: impl Into<String>, attributes: BlockTypeAttributes, faces: Vec<BlockFace>) -> Self {
        Self {
            id: id.into(),
            attributes,
            faces,
        }
    }

    /// Unique string id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Meshing properties.
    pub fn attributes(&self) -> BlockTypeAttributes {
        self.attributes
    }

    /// Whether neighbors show through this block.
    pub fn is_transparent(&self) -> bool {
        self.attributes.transparent
    }

    /// All faces, in definition order.
    pub fn faces(&self) -> &[BlockFace] {
        &self.faces
    }

    /// The face lying on `side`, if the type has one.
    pub fn face_on(&self, side: BlockSide) -> Option<&BlockFace> {
        self.faces
            .iter()
            .find(|face| face.direction() == FaceDirection::Directional(side))
    }
}

#[cfg(test)]
mod tests {
    use crate::engine_state::rendering::atlas::{MemoryTextures, PixelFormat, StreamingAtlas};

    use super::*;

    fn direct_faces() -> [FaceTexture; 6] {
        std::array::from_fn(|i| FaceTexture::Direct(i as u32))
    }

    #[test]
    fn cube_faces_follow_side_order() {
        let cube = BlockType::cube("stone", BlockTypeAttributes::default(), direct_faces());

        assert_eq!(cube.faces().len(), 6);
        for (face, side) in cube.faces().iter().zip(BlockSide::all()) {
            assert_eq!(face.direction(), FaceDirection::Directional(side));
            assert_eq!(face.indices(), &QUAD_INDICES);
            for vertex in face.vertices() {
                assert_eq!(vertex.normal, side.normal());
            }
        }
        assert!(matches!(
            cube.face_on(BlockSide::TOP).map(BlockFace::texture),
            Some(FaceTexture::Direct(2))
        ));
    }

    #[test]
    fn direct_textures_keep_local_uvs() {
        let cube = BlockType::cube("stone", BlockTypeAttributes::default(), direct_faces());
        let face = &cube.faces()[0];
        assert_eq!(face.vertices()[3].uv, [1.0, 1.0]);
        assert_eq!(face.vertices()[3].cell, [0, 0]);
    }

    #[test]
    fn atlas_textures_are_remapped_once() {
        let mut atlas =
            StreamingAtlas::with_pixel_formats(1, 4, vec![PixelFormat::R8], MemoryTextures::new()).unwrap();
        let _skipped = atlas.allocate(&[[0u8]]).unwrap();
        let cell = Rc::new(atlas.allocate(&[[0u8]]).unwrap());
        assert_eq!((cell.x(), cell.y()), (1, 0));

        let face = BlockFace::new(
            CUBE_FACE_VERTICES[0].to_vec(),
            QUAD_INDICES.to_vec(),
            FaceTexture::Atlas(cell),
        )
        .unwrap();

        assert_eq!(face.vertices()[0].uv, [0.25, 0.0]);
        assert_eq!(face.vertices()[3].uv, [0.5, 0.25]);
        assert!(face.vertices().iter().all(|v| v.cell == [1, 0]));
    }

    #[test]
    fn cross_faces_are_non_directional() {
        let cross = BlockType::cross(
            "grass_tuft",
            BlockTypeAttributes { transparent: true },
            FaceTexture::Direct(0),
        );
        assert_eq!(cross.faces().len(), 4);
        assert!(cross
            .faces()
            .iter()
            .all(|face| face.direction() == FaceDirection::NonDirectional));
        assert!(cross.face_on(BlockSide::TOP).is_none());
    }

    #[test]
    fn invalid_face_definitions_are_rejected() {
        let vertices = CUBE_FACE_VERTICES[0].to_vec();

        let err = BlockFace::new(vertices.clone(), vec![0, 1], FaceTexture::Direct(0)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTriangleList(2)));

        let err = BlockFace::new(vertices, vec![0, 1, 4], FaceTexture::Direct(0)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidFaceIndex {
                index: 4,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn faces_with_any_vertex_count_are_accepted() {
        let triangle = vec![
            BlockVertex::new([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
            BlockVertex::new([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
            BlockVertex::new([0.0, 0.5, 0.5], [0.0, 1.0, 0.0], [0.5, 1.0]),
        ];
        let face = BlockFace::new(triangle, vec![0, 2, 1], FaceTexture::Direct(0)).unwrap();
        assert_eq!(face.direction(), FaceDirection::Directional(BlockSide::TOP));
    }
}
