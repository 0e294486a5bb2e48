//! # Block Catalog Module
//!
//! The catalog owns every [`BlockType`] for the lifetime of the scene and hands out
//! compact [`BlockTypeId`]s that grid slots store instead of the type itself.
//!
//! Catalogs are usually built from a JSON block table:
//!
//! ```json
//! {
//!   "atlas": { "cell_side": 16, "cells_per_side": 16, "formats": ["rgba8_srgb"] },
//!   "blocks": [
//!     { "id": "dirt", "textures": { "all": "dirt.png" } },
//!     { "id": "grass", "textures": { "top": "grass_top.png", "bottom": "dirt.png", "side": "grass_side.png" } },
//!     { "id": "glass", "transparent": true, "textures": { "all": "glass.png" } },
//!     { "id": "tuft", "shape": "cross", "transparent": true, "textures": { "all": "tuft.png" } }
//!   ]
//! }
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, info};
use serde::Deserialize;

use crate::{
    engine_state::rendering::atlas::{AtlasCell, PixelFormat, StreamingAtlas, TextureSink},
    error::{AtlasResult, CatalogError, CatalogResult, ConfigError},
};

use super::{
    block_side::BlockSide,
    block_type::{BlockType, BlockTypeAttributes, FaceTexture},
    Block, BlockTypeId,
};

/// Geometry and layer formats of the atlas a block table is packed into.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Side length of one cell in pixels; every texture file must be this size.
    pub cell_side: u32,
    /// Number of cells along each side of the atlas.
    pub cells_per_side: u32,
    /// Pixel format name of each layer (`r8`, `rg8`, `rgba8`, `rgba8_srgb`).
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_formats() -> Vec<String> {
    vec!["rgba8".to_string()]
}

impl AtlasConfig {
    /// Resolves the configured format names.
    pub fn pixel_formats(&self) -> AtlasResult<Vec<PixelFormat>> {
        self.formats
            .iter()
            .map(|name| PixelFormat::from_name(name))
            .collect()
    }
}

/// Geometry a block table entry builds.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockShape {
    /// A full unit cube with six textured faces.
    #[default]
    Cube,
    /// Two crossed diagonal quads sharing one texture.
    Cross,
}

/// What a face samples.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TextureRef {
    /// A separately bound texture slot.
    Direct {
        /// Renderer texture slot.
        direct: u32,
    },
    /// One file, for a single-layer atlas.
    File(String),
    /// One file per atlas layer, in layer order.
    Layers(Vec<String>),
}

/// Texture assignment of a block table entry.
///
/// A face uses its own key if present, then `top`/`bottom`/`side`, then `all`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FaceTexturesConfig {
    /// Fallback for every face.
    pub all: Option<TextureRef>,
    /// The four X and Z faces.
    pub side: Option<TextureRef>,
    /// Y+ face.
    pub top: Option<TextureRef>,
    /// Y- face.
    pub bottom: Option<TextureRef>,
    /// X+ face.
    pub right: Option<TextureRef>,
    /// X- face.
    pub left: Option<TextureRef>,
    /// Z+ face.
    pub front: Option<TextureRef>,
    /// Z- face.
    pub back: Option<TextureRef>,
}

impl FaceTexturesConfig {
    /// The texture used by the cube face on `side`.
    pub fn for_side(&self, side: BlockSide) -> Option<&TextureRef> {
        let (own, group) = match side {
            BlockSide::RIGHT => (&self.right, &self.side),
            BlockSide::LEFT => (&self.left, &self.side),
            BlockSide::TOP => (&self.top, &self.top),
            BlockSide::BOTTOM => (&self.bottom, &self.bottom),
            BlockSide::FRONT => (&self.front, &self.side),
            BlockSide::BACK => (&self.back, &self.side),
        };
        own.as_ref().or(group.as_ref()).or(self.all.as_ref())
    }
}

/// One entry of the block table.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockTypeConfig {
    /// Unique string id.
    pub id: String,
    /// Whether neighbors show through the block.
    #[serde(default)]
    pub transparent: bool,
    /// Geometry.
    #[serde(default)]
    pub shape: BlockShape,
    /// Face textures.
    pub textures: FaceTexturesConfig,
}

/// A whole block table file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Atlas the table's textures are packed into.
    pub atlas: AtlasConfig,
    /// Block types in registration order.
    pub blocks: Vec<BlockTypeConfig>,
}

impl CatalogConfig {
    /// Reads a block table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        crate::application_state::read_json_file(path)
    }
}

/// Registry of every block type in a scene.
#[derive(Debug, Default)]
pub struct BlockCatalog {
    types: Vec<BlockType>,
    ids: HashMap<String, BlockTypeId>,
}

impl BlockCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block type and returns the id grid slots use to refer to it.
    ///
    /// # Errors
    /// * `CatalogError::DuplicateBlockId` if a type with the same string id exists
    /// * `CatalogError::TooManyBlockTypes` if the id space is exhausted
    pub fn register(&mut self, block_type: BlockType) -> CatalogResult<BlockTypeId> {
        if self.ids.contains_key(block_type.id()) {
            return Err(CatalogError::DuplicateBlockId(block_type.id().to_string()));
        }
        let id = u16::try_from(self.types.len())
            .map(BlockTypeId)
            .map_err(|_| CatalogError::TooManyBlockTypes)?;

        self.ids.insert(block_type.id().to_string(), id);
        self.types.push(block_type);
        Ok(id)
    }

    /// Looks up a block type by id.
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockType> {
        self.types.get(id.index())
    }

    /// Finds the id registered for a string id.
    pub fn id_of(&self, name: &str) -> Option<BlockTypeId> {
        self.ids.get(name).copied()
    }

    /// Creates a block of the named type.
    ///
    /// # Errors
    /// `CatalogError::UnknownBlockId` if no type has that string id.
    pub fn block(&self, name: &str) -> CatalogResult<Block> {
        self.id_of(name)
            .map(Block::new)
            .ok_or_else(|| CatalogError::UnknownBlockId(name.to_string()))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All types with their ids, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockTypeId, &BlockType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, block_type)| (BlockTypeId(i as u16), block_type))
    }

    /// Builds a catalog from a block table, packing its textures into `atlas`.
    ///
    /// Every distinct texture file list is decoded and allocated once; faces and blocks
    /// that name the same files share the resulting cell.
    ///
    /// # Arguments
    /// * `config` - The block table
    /// * `atlas` - Atlas receiving the textures
    /// * `texture_root` - Directory texture file names are relative to
    ///
    /// # Errors
    /// Any duplicate id, missing face texture or atlas failure aborts the whole build.
    pub fn from_config<S: TextureSink>(
        config: &CatalogConfig,
        atlas: &mut StreamingAtlas<S>,
        texture_root: &Path,
    ) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        let mut loaded: HashMap<Vec<PathBuf>, Rc<AtlasCell>> = HashMap::new();

        for entry in &config.blocks {
            let attributes = BlockTypeAttributes {
                transparent: entry.transparent,
            };
            let mut texture = |reference: Option<&TextureRef>,
                               face: &'static str|
             -> CatalogResult<FaceTexture> {
                let reference = reference.ok_or_else(|| CatalogError::MissingFaceTexture {
                    block: entry.id.clone(),
                    face,
                })?;
                face_texture(reference, atlas, texture_root, &mut loaded)
            };

            let block_type = match entry.shape {
                BlockShape::Cube => {
                    let [right, left, top, bottom, front, back] = BlockSide::all()
                        .map(|side| texture(entry.textures.for_side(side), side.name()));
                    BlockType::cube(
                        entry.id.clone(),
                        attributes,
                        [right?, left?, top?, bottom?, front?, back?],
                    )
                }
                BlockShape::Cross => {
                    let reference = entry.textures.all.as_ref().or(entry.textures.side.as_ref());
                    BlockType::cross(entry.id.clone(), attributes, texture(reference, "all")?)
                }
            };

            let id = catalog.register(block_type)?;
            info!(
                "Registered block type {:?} as {} ({:?})",
                entry.id, id.0, entry.shape
            );
        }

        info!(
            "Block catalog ready: {} types, {} atlas cells",
            catalog.len(),
            loaded.len()
        );
        Ok(catalog)
    }
}

/// Resolves one texture reference, allocating atlas cells only for files not seen before.
fn face_texture<S: TextureSink>(
    reference: &TextureRef,
    atlas: &mut StreamingAtlas<S>,
    texture_root: &Path,
    loaded: &mut HashMap<Vec<PathBuf>, Rc<AtlasCell>>,
) -> CatalogResult<FaceTexture> {
    let files: Vec<PathBuf> = match reference {
        TextureRef::Direct { direct } => return Ok(FaceTexture::Direct(*direct)),
        TextureRef::File(file) => vec![texture_root.join(file)],
        TextureRef::Layers(files) => files.iter().map(|file| texture_root.join(file)).collect(),
    };

    if let Some(cell) = loaded.get(&files) {
        debug!("Reusing atlas cell ({}, {}) for {:?}", cell.x(), cell.y(), files);
        return Ok(FaceTexture::Atlas(Rc::clone(cell)));
    }

    let cell = Rc::new(atlas.allocate_from_files(&files)?);
    loaded.insert(files, Rc::clone(&cell));
    Ok(FaceTexture::Atlas(cell))
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use crate::{
        engine_state::rendering::atlas::MemoryTextures,
        error::AtlasError,
    };

    use super::*;

    fn texture_dir(test: &str, files: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "voxel-mesher-catalog-{}-{}",
            test,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for (i, file) in files.iter().enumerate() {
            RgbaImage::from_pixel(2, 2, Rgba([i as u8, 0, 0, 255]))
                .save(dir.join(file))
                .unwrap();
        }
        dir
    }

    fn atlas() -> StreamingAtlas<MemoryTextures> {
        StreamingAtlas::with_pixel_formats(2, 4, vec![PixelFormat::Rgba8], MemoryTextures::new())
            .unwrap()
    }

    fn table(json: &str) -> CatalogConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = BlockCatalog::new();
        let faces = || std::array::from_fn(|_| FaceTexture::Direct(0));
        let stone = catalog
            .register(BlockType::cube("stone", BlockTypeAttributes::default(), faces()))
            .unwrap();

        let err = catalog
            .register(BlockType::cube("stone", BlockTypeAttributes::default(), faces()))
            .unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateBlockId(id) if id == "stone"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.id_of("stone"), Some(stone));
        assert_eq!(catalog.block("stone").unwrap().block_type, stone);
        assert!(matches!(
            catalog.block("dirt"),
            Err(CatalogError::UnknownBlockId(_))
        ));
    }

    #[test]
    fn shared_texture_files_are_allocated_once() {
        let root = texture_dir("shared", &["dirt.png", "grass_top.png", "grass_side.png"]);
        let config = table(
            r#"{
                "atlas": { "cell_side": 2, "cells_per_side": 4 },
                "blocks": [
                    { "id": "dirt", "textures": { "all": "dirt.png" } },
                    { "id": "grass", "textures": {
                        "top": "grass_top.png", "bottom": "dirt.png", "side": "grass_side.png"
                    } }
                ]
            }"#,
        );
        let mut atlas = atlas();

        let catalog = BlockCatalog::from_config(&config, &mut atlas, &root).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(atlas.occupied(), 3);

        let dirt = catalog.get(catalog.id_of("dirt").unwrap()).unwrap();
        let grass = catalog.get(catalog.id_of("grass").unwrap()).unwrap();
        let cell_of = |block: &BlockType, side: BlockSide| {
            block.faces()[side as usize].texture().cell().map(AtlasCell::index)
        };
        assert_eq!(cell_of(grass, BlockSide::BOTTOM), cell_of(dirt, BlockSide::TOP));
        assert_eq!(cell_of(grass, BlockSide::RIGHT), cell_of(grass, BlockSide::BACK));
        assert_ne!(cell_of(grass, BlockSide::TOP), cell_of(grass, BlockSide::RIGHT));

        drop(catalog);
        assert_eq!(atlas.occupied(), 0);
    }

    #[test]
    fn cross_and_direct_entries() {
        let root = texture_dir("cross", &["tuft.png"]);
        let config = table(
            r#"{
                "atlas": { "cell_side": 2, "cells_per_side": 4, "formats": ["rgba8"] },
                "blocks": [
                    { "id": "tuft", "shape": "cross", "transparent": true, "textures": { "all": "tuft.png" } },
                    { "id": "marker", "textures": { "all": { "direct": 3 } } }
                ]
            }"#,
        );
        let mut atlas = atlas();

        let catalog = BlockCatalog::from_config(&config, &mut atlas, &root).unwrap();

        let tuft = catalog.get(BlockTypeId(0)).unwrap();
        assert!(tuft.is_transparent());
        assert_eq!(tuft.faces().len(), 4);
        let marker = catalog.get(BlockTypeId(1)).unwrap();
        assert!(matches!(marker.faces()[0].texture(), FaceTexture::Direct(3)));
        assert_eq!(atlas.occupied(), 1);
    }

    #[test]
    fn missing_face_texture_is_reported() {
        let config = table(
            r#"{
                "atlas": { "cell_side": 2, "cells_per_side": 4 },
                "blocks": [ { "id": "half", "textures": { "top": { "direct": 0 } } } ]
            }"#,
        );

        let err = BlockCatalog::from_config(&config, &mut atlas(), Path::new(".")).unwrap_err();

        assert!(matches!(
            err,
            CatalogError::MissingFaceTexture { ref block, face: "right" } if block == "half"
        ));
    }

    #[test]
    fn missing_texture_file_fails_the_build() {
        let config = table(
            r#"{
                "atlas": { "cell_side": 2, "cells_per_side": 4 },
                "blocks": [ { "id": "ghost", "textures": { "all": "ghost.png" } } ]
            }"#,
        );
        let mut atlas = atlas();

        let err = BlockCatalog::from_config(&config, &mut atlas, Path::new("/nonexistent")).unwrap_err();

        assert!(matches!(err, CatalogError::Atlas(AtlasError::Decode(_))));
        assert_eq!(atlas.occupied(), 0);
    }

    #[test]
    fn format_names_resolve() {
        let config = AtlasConfig {
            cell_side: 16,
            cells_per_side: 16,
            formats: vec!["rgba8_srgb".into(), "r8".into()],
        };
        assert_eq!(
            config.pixel_formats().unwrap(),
            vec![PixelFormat::Rgba8Srgb, PixelFormat::R8]
        );

        let config = AtlasConfig {
            formats: vec!["rgb8".into()],
            ..config
        };
        assert!(matches!(
            config.pixel_formats(),
            Err(AtlasError::UnsupportedFormat(_))
        ));
    }
}
