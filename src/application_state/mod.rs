//! # Application State Management
//!
//! This module handles what the binary needs before the engine can load:
//! - Configuration files (application settings and block tables)
//! - Headless graphics initialization

pub mod graphics;

use std::{
    fs,
    path::{Path, PathBuf},
};

use cgmath::{Point3, Vector3};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    engine_state::voxels::{
        block::catalog::BlockCatalog,
        grid::{grid_generation::DEFAULT_TERRAIN_SCALE, GridGenerator, ScenePalette},
    },
    error::{CatalogResult, ConfigError},
};

/// Default location of the block table.
pub const DEFAULT_CATALOG_PATH: &str = "assets/blocks.json";
/// Default directory texture file names are relative to.
pub const DEFAULT_TEXTURE_ROOT: &str = "assets/textures";

/// Reads and deserializes a JSON file.
///
/// # Errors
/// `ConfigError::Io` if the file cannot be read, `ConfigError::Parse` if it does not
/// match `T`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Settings of one run of the binary.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// The block table
    pub catalog_path: PathBuf,
    /// Directory texture file names are relative to
    pub texture_root: PathBuf,
    /// Try to create a GPU device; the CPU texture sink is used otherwise
    pub use_gpu: bool,
    /// The scene to mesh
    pub scene: SceneConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            texture_root: PathBuf::from(DEFAULT_TEXTURE_ROOT),
            use_gpu: true,
            scene: SceneConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads settings from a JSON file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json_file(path)
    }
}

/// Grid placement, size and content.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// World position of the first grid slot
    pub base: [i32; 3],
    /// Slots along each axis
    pub size: [usize; 3],
    /// How the grid is filled
    pub generator: GridGenerator,
    /// Block id capping terrain columns
    pub surface: String,
    /// Block id used everywhere else
    pub filler: String,
    /// Block id scattered on the terrain surface
    pub decoration: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            base: [-16, 0, -16],
            size: [32, 16, 32],
            generator: GridGenerator::Terrain {
                seed: 0,
                scale: DEFAULT_TERRAIN_SCALE,
            },
            surface: "grass".to_string(),
            filler: "dirt".to_string(),
            decoration: Some("tuft".to_string()),
        }
    }
}

impl SceneConfig {
    /// World position of the first grid slot.
    pub fn base(&self) -> Point3<i32> {
        Point3::from(self.base)
    }

    /// Slots along each axis.
    pub fn size(&self) -> Vector3<usize> {
        Vector3::from(self.size)
    }

    /// Resolves the configured block ids.
    ///
    /// # Errors
    /// `CatalogError::UnknownBlockId` for an id the catalog does not have.
    pub fn palette(&self, catalog: &BlockCatalog) -> CatalogResult<ScenePalette> {
        Ok(ScenePalette {
            surface: catalog.block(&self.surface)?,
            filler: catalog.block(&self.filler)?,
            decoration: self
                .decoration
                .as_deref()
                .map(|id| catalog.block(id))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "use_gpu": false, "scene": { "size": [4, 4, 4], "generator": { "kind": "solid" } } }"#,
        )
        .unwrap();

        assert!(!config.use_gpu);
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.scene.size(), Vector3::new(4, 4, 4));
        assert_eq!(config.scene.generator, GridGenerator::Solid);
        assert_eq!(config.scene.filler, "dirt");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("voxel-mesher-config-{}.json", std::process::id()));
        fs::write(&path, "{ \"use_gpu\": 3 }").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
