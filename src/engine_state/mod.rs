//! # Engine State Module
//!
//! The core engine module: block definitions, the voxel grid, the texture atlas and
//! the mesh builder, plus the load phase that wires them together.
//!
//! ## Key Components
//!
//! * `EngineState` - Everything the load phase produces
//! * `rendering` - Texture atlas, vertex format and mesh building
//! * `voxels` - Block types, the block catalog and the voxel grid
//!
//! ## Load Phase
//!
//! 1. Read the block table and create an atlas with its geometry
//! 2. Pack every block texture into the atlas and register the block types
//! 3. Create the grid and fill it with the configured scene
//! 4. Build the visible-face mesh
//!
//! Each step runs once, on one thread; nothing is rebuilt afterwards.

use std::path::Path;

use log::info;
use web_time::Instant;

use crate::{
    application_state::{AppConfig, SceneConfig},
    error::EngineResult,
};

use rendering::{
    atlas::{StreamingAtlas, TextureSink},
    meshing::BlocksMesh,
};
use voxels::{
    block::catalog::{BlockCatalog, CatalogConfig},
    grid::VoxelGrid,
};

pub mod rendering;
pub mod voxels;

/// The products of the load phase.
pub struct EngineState<S: TextureSink> {
    /// Atlas holding every block texture
    pub atlas: StreamingAtlas<S>,
    /// Every block type of the scene
    pub catalog: BlockCatalog,
    /// The scene
    pub grid: VoxelGrid,
    /// Visible faces of the scene
    pub mesh: BlocksMesh,
}

impl<S: TextureSink> EngineState<S> {
    /// Runs the load phase from files named in `config`.
    ///
    /// # Arguments
    /// * `config` - Application settings
    /// * `sink` - Storage for the atlas layers
    ///
    /// # Errors
    /// Any configuration, atlas, catalog, grid or mesh error; nothing is returned
    /// half-built.
    pub fn load(config: &AppConfig, sink: S) -> EngineResult<Self> {
        let catalog_config = CatalogConfig::load(&config.catalog_path)?;
        Self::new(&catalog_config, &config.texture_root, &config.scene, sink)
    }

    /// Runs the load phase from an already parsed block table.
    ///
    /// # Arguments
    /// * `catalog_config` - The block table
    /// * `texture_root` - Directory texture file names are relative to
    /// * `scene` - Grid placement and content
    /// * `sink` - Storage for the atlas layers
    pub fn new(
        catalog_config: &CatalogConfig,
        texture_root: &Path,
        scene: &SceneConfig,
        sink: S,
    ) -> EngineResult<Self> {
        let start = Instant::now();

        let atlas_config = &catalog_config.atlas;
        let mut atlas = StreamingAtlas::with_pixel_formats(
            atlas_config.cell_side,
            atlas_config.cells_per_side,
            atlas_config.pixel_formats()?,
            sink,
        )?;
        let catalog = BlockCatalog::from_config(catalog_config, &mut atlas, texture_root)?;

        let palette = scene.palette(&catalog)?;
        let mut grid = VoxelGrid::new(scene.base(), scene.size())?;
        grid.generate(&scene.generator, &palette);

        let mesh = BlocksMesh::build(&grid, &catalog)?;

        info!("Load phase finished in {:?}", start.elapsed());
        Ok(Self {
            atlas,
            catalog,
            grid,
            mesh,
        })
    }

    /// Logs what the load phase produced.
    pub fn log_summary(&self) {
        info!(
            "{} block types in {}/{} atlas cells; {} of {} slots occupied; {} faces, {} triangles",
            self.catalog.len(),
            self.atlas.occupied(),
            self.atlas.capacity(),
            self.grid.occupied_count(),
            self.grid.len(),
            self.mesh.faces,
            self.mesh.triangle_count()
        );
    }
}
