//! # Error Types
//!
//! Every error the load phase can raise, grouped per subsystem. Each subsystem
//! error converts into [`EngineError`] so the pipeline in `engine_state` can use `?`
//! across subsystem boundaries.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the streaming texture atlas.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// A requested pixel format is not one the atlas can store.
    #[error("unsupported texture format: {0}")]
    UnsupportedFormat(String),

    /// The caller passed a different number (or size) of buffers than the atlas expects.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// Every cell of the atlas is occupied.
    #[error("texture atlas is full ({capacity} cells in use)")]
    AtlasFull {
        /// Total number of cells in the atlas.
        capacity: usize,
    },

    /// A texture file could not be decoded into a cell.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors raised while decoding a texture file into cell pixels.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("cannot open texture file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a readable PNG.
    #[error("error reading texture file {path}: {source}")]
    Image {
        /// Path of the file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image is not exactly the expected size.
    #[error("texture file {path} is {width}x{height}, expected {expected_width}x{expected_height}")]
    Dimensions {
        /// Path of the file.
        path: PathBuf,
        /// Actual width.
        width: u32,
        /// Actual height.
        height: u32,
        /// Required width.
        expected_width: u32,
        /// Required height.
        expected_height: u32,
    },

    /// The image color type or bit depth does not match the target pixel format.
    #[error("unsupported image format in texture file {path}: {found:?}, expected {expected:?}")]
    ColorType {
        /// Path of the file.
        path: PathBuf,
        /// Color type found in the file.
        found: image::ColorType,
        /// Color type the pixel format requires.
        expected: image::ColorType,
    },
}

/// Errors raised by mutating or checked access to the voxel grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A world position lies outside the grid.
    #[error("position ({x}, {y}, {z}) is outside the grid")]
    OutOfRange {
        /// World X.
        x: i32,
        /// World Y.
        y: i32,
        /// World Z.
        z: i32,
    },

    /// A flat storage index is past the end of the grid.
    #[error("storage index {index} is outside the grid of {len} slots")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of slots in the grid.
        len: usize,
    },

    /// A grid geometry that cannot be addressed.
    #[error("grid of size {size:?} at {base:?} does not fit the i32 world or usize storage")]
    InvalidSize {
        /// Requested base position.
        base: [i32; 3],
        /// Requested size.
        size: [usize; 3],
    },
}

/// Errors raised while defining block types or building the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two block types were registered under the same string id.
    #[error("block id {0:?} is already registered")]
    DuplicateBlockId(String),

    /// A block id was looked up but never registered.
    #[error("unknown block id {0:?}")]
    UnknownBlockId(String),

    /// A face triangle index points past the face's vertex list.
    #[error("face index {index} does not reference one of the {vertex_count} face vertices")]
    InvalidFaceIndex {
        /// The offending index.
        index: u32,
        /// Number of vertices the face defines.
        vertex_count: usize,
    },

    /// A face index list is not made of whole triangles.
    #[error("face index list of length {0} is not a triangle list")]
    InvalidTriangleList(usize),

    /// A block table entry does not say which texture a face uses.
    #[error("block {block:?} has no texture for face {face}")]
    MissingFaceTexture {
        /// Block id.
        block: String,
        /// Face name.
        face: &'static str,
    },

    /// The catalog has more block types than a [`crate::BlockTypeId`] can address.
    #[error("too many block types")]
    TooManyBlockTypes,

    /// A texture for the catalog could not be placed in the atlas.
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// Errors raised while building a mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A grid slot references a block type the catalog does not contain.
    #[error("slot {index} references block type {block_type} which is not in the catalog")]
    UnknownBlockType {
        /// Storage index of the slot.
        index: usize,
        /// The unknown block type id.
        block_type: u16,
    },

    /// The mesh grew past what 32-bit indices can address.
    #[error("mesh has more vertices than 32-bit indices can address")]
    IndexOverflow,
}

/// Errors raised while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected schema.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while bringing up a headless GPU device.
#[derive(Error, Debug)]
pub enum GraphicsError {
    /// No adapter matched the request.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device.
    #[error("cannot create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Top-level error of the load pipeline.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Texture atlas failure.
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    /// Catalog failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Grid failure.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Mesh failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for atlas operations.
pub type AtlasResult<T> = Result<T, AtlasError>;
/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
/// Result type for the load pipeline.
pub type EngineResult<T> = Result<T, EngineError>;
