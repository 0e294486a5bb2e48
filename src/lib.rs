#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! Turns a bounded grid of typed voxel blocks into a single triangle mesh that holds
//! only the faces that can be seen, with block textures packed into a streaming atlas.
//!
//! ## Key Modules
//!
//! * `application_state` - Configuration files and headless GPU bring-up
//! * `core` - Shared-resource utilities used throughout the engine
//! * `engine_state` - Atlas, block catalog, voxel grid and the mesh builder
//! * `error` - Error types of every subsystem
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if voxel_mesher::run().is_err() {
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! The pieces can also be used directly:
//!
//! ```
//! use cgmath::{Point3, Vector3};
//! use voxel_mesher::{
//!     BlockCatalog, BlockType, BlockTypeAttributes, BlocksMesh, FaceTexture, VoxelGrid,
//! };
//!
//! let mut catalog = BlockCatalog::new();
//! let stone = catalog
//!     .register(BlockType::cube(
//!         "stone",
//!         BlockTypeAttributes::default(),
//!         std::array::from_fn(|_| FaceTexture::Direct(0)),
//!     ))
//!     .unwrap();
//!
//! let mut grid = VoxelGrid::new(Point3::new(0, 0, 0), Vector3::new(2, 1, 1)).unwrap();
//! grid.fill(Point3::new(0, 0, 0), Point3::new(1, 0, 0), voxel_mesher::Block::new(stone))
//!     .unwrap();
//!
//! let mesh = BlocksMesh::build(&grid, &catalog).unwrap();
//! assert_eq!(mesh.faces, 10);
//! ```

use std::path::Path;

use application_state::{graphics::request_headless_graphics, AppConfig};
use log::{error, info, warn};

pub mod application_state;
pub mod core;
pub mod engine_state;
pub mod error;

pub use engine_state::{
    rendering::{
        atlas::{AtlasCell, MemoryTextures, PixelFormat, StreamingAtlas, TextureSink, WgpuTextures},
        meshing::{is_face_occluded, BlocksMesh, MeshBuffers},
        BlockVertex,
    },
    voxels::{
        block::{
            block_side::{BlockSide, FaceDirection},
            block_type::{BlockFace, BlockType, BlockTypeAttributes, FaceTexture},
            catalog::{BlockCatalog, CatalogConfig},
            Block, BlockTypeId,
        },
        grid::{GridGenerator, ScenePalette, VoxelGrid},
    },
    EngineState,
};
pub use error::{EngineError, EngineResult};

/// Loads the configured scene, builds its mesh and uploads it to the GPU when one exists.
///
/// The first command line argument, if any, names an [`AppConfig`] JSON file; built-in
/// defaults are used otherwise. Without a usable GPU adapter the atlas is kept in memory.
///
/// # Errors
/// Any error of the load phase.
pub fn run() -> EngineResult<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path))?,
        None => AppConfig::default(),
    };

    let graphics = if config.use_gpu {
        match request_headless_graphics() {
            Ok(graphics) => Some(graphics),
            Err(err) => {
                warn!("{err}; keeping the texture atlas in memory");
                None
            }
        }
    } else {
        None
    };

    let result = match &graphics {
        Some(graphics) => EngineState::load(
            &config,
            WgpuTextures::new(&graphics.device, &graphics.queue),
        )
        .and_then(|mut state| {
            let _atlas_bind_group = state.atlas.bind();
            let buffers = state.mesh.create_buffers(&graphics.device)?;
            info!(
                "Uploaded block mesh to {}: {} indices",
                graphics.adapter_info.name, buffers.index_count
            );
            state.log_summary();
            Ok(())
        }),
        None => EngineState::load(&config, MemoryTextures::new()).map(|mut state| {
            let _atlas_layers = state.atlas.bind();
            state.log_summary();
        }),
    };

    if let Err(err) = &result {
        error!("Load failed: {err}");
    }
    result
}
