//! # Streaming Texture Atlas
//!
//! A set of parallel, same-sized texture layers split into a square grid of
//! fixed-size cells. One allocation reserves the same cell in every layer (for example
//! color in layer 0 and a mask in layer 1) and returns an [`AtlasCell`] handle.
//!
//! ## Layout
//!
//! Each layer is `cell_side * cells_per_side` pixels square. Cells are numbered
//! row-major from the bottom-left corner: cell index `i` sits at
//! `(i % cells_per_side, i / cells_per_side)`.
//!
//! ## Occupancy
//!
//! The registry is one bit per cell. A bit is set while the [`AtlasCell`] for that cell
//! is alive and cleared when the handle drops, whatever path drops it. Allocation is
//! first-fit by ascending index, so a given sequence of allocations and releases always
//! produces the same cells.

use std::{fmt, path::Path};

use bitvec::prelude::BitVec;
use log::{debug, info, warn};

use crate::{
    core::StResource,
    error::{AtlasError, AtlasResult},
};

use super::texture::load_texture_file;

pub mod gpu;
mod pixel_format;
pub mod sink;

pub use gpu::WgpuTextures;
pub use pixel_format::PixelFormat;
pub use sink::{MemoryLayer, MemoryTextures, TextureSink};

/// Allocator for fixed-size texture cells spread over one or more layers.
pub struct StreamingAtlas<S: TextureSink> {
    /// Side length of one cell in pixels
    cell_side: u32,
    /// Number of cells along each side of a layer
    cells_per_side: u32,
    /// Pixel format of each layer
    formats: Vec<PixelFormat>,
    /// One bit per cell, set while a handle owns the cell
    registry: StResource<BitVec>,
    /// Where texel data goes
    sink: S,
}

impl<S: TextureSink> StreamingAtlas<S> {
    /// Creates an atlas from GPU texture formats.
    ///
    /// # Arguments
    /// * `cell_side` - Side length of one cell in pixels
    /// * `cells_per_side` - Number of cells along each side of a layer
    /// * `formats` - One texture format per layer
    /// * `sink` - Storage for the layers
    ///
    /// # Errors
    /// * `AtlasError::UnsupportedFormat` if any format is outside the supported set
    /// * `AtlasError::ArgumentMismatch` for a zero or overflowing geometry or no formats
    pub fn new(
        cell_side: u32,
        cells_per_side: u32,
        formats: &[wgpu::TextureFormat],
        sink: S,
    ) -> AtlasResult<Self> {
        let formats = formats
            .iter()
            .map(|&format| PixelFormat::try_from(format))
            .collect::<AtlasResult<Vec<_>>>()?;

        Self::with_pixel_formats(cell_side, cells_per_side, formats, sink)
    }

    /// Creates an atlas from already-validated pixel formats.
    ///
    /// # Errors
    /// `AtlasError::ArgumentMismatch` for a zero or overflowing geometry or no formats.
    pub fn with_pixel_formats(
        cell_side: u32,
        cells_per_side: u32,
        formats: Vec<PixelFormat>,
        mut sink: S,
    ) -> AtlasResult<Self> {
        if cell_side == 0 || cells_per_side == 0 {
            return Err(AtlasError::ArgumentMismatch(format!(
                "atlas geometry {cell_side}px x {cells_per_side} cells has no area"
            )));
        }
        if formats.is_empty() {
            return Err(AtlasError::ArgumentMismatch(
                "an atlas needs at least one texture format".to_string(),
            ));
        }
        let side = cell_side.checked_mul(cells_per_side).ok_or_else(|| {
            AtlasError::ArgumentMismatch(format!(
                "atlas side {cell_side}px x {cells_per_side} cells does not fit in 32 bits"
            ))
        })?;
        let capacity = cells_per_side as usize * cells_per_side as usize;

        sink.create_layers(&formats, side);
        info!(
            "Created {}x{} atlas of {} cells ({}px each) over {} layer(s)",
            side,
            side,
            capacity,
            cell_side,
            formats.len()
        );

        Ok(Self {
            cell_side,
            cells_per_side,
            formats,
            registry: StResource::new(BitVec::repeat(false, capacity)),
            sink,
        })
    }

    /// Reserves the first free cell and uploads one buffer per layer into it.
    ///
    /// # Arguments
    /// * `data` - One buffer per configured format, in format order, each holding
    ///   `cell_side * cell_side` pixels packed bottom row first
    ///
    /// # Returns
    /// The handle owning the cell. Dropping it frees the cell.
    ///
    /// # Errors
    /// * `AtlasError::ArgumentMismatch` if the buffer count or a buffer length is wrong
    /// * `AtlasError::AtlasFull` if no cell is free
    ///
    /// Nothing is reserved or written when an error is returned.
    pub fn allocate<B: AsRef<[u8]>>(&mut self, data: &[B]) -> AtlasResult<AtlasCell> {
        if data.len() != self.formats.len() {
            return Err(AtlasError::ArgumentMismatch(format!(
                "{} buffers supplied for {} textures",
                data.len(),
                self.formats.len()
            )));
        }
        for (layer, (buffer, format)) in data.iter().zip(&self.formats).enumerate() {
            let expected = self.cell_bytes(*format);
            let found = buffer.as_ref().len();
            if found != expected {
                return Err(AtlasError::ArgumentMismatch(format!(
                    "buffer for layer {layer} is {found} bytes, a {format:?} cell needs {expected}"
                )));
            }
        }

        let free = self.registry.get().first_zero();
        let Some(index) = free else {
            warn!("Texture atlas is full ({} cells)", self.capacity());
            return Err(AtlasError::AtlasFull {
                capacity: self.capacity(),
            });
        };
        self.registry.get_mut().set(index, true);

        let x = index as u32 % self.cells_per_side;
        let y = index as u32 / self.cells_per_side;
        let origin = [x * self.cell_side, y * self.cell_side];
        for (layer, buffer) in data.iter().enumerate() {
            self.sink
                .write_cell(layer, origin, self.cell_side, buffer.as_ref());
        }
        debug!("Allocated atlas cell ({x}, {y})");

        Ok(AtlasCell {
            registry: self.registry.clone(),
            x,
            y,
            cells_per_side: self.cells_per_side,
        })
    }

    /// Decodes one texture file per layer and allocates a cell for them.
    ///
    /// Each file must be a PNG of exactly `cell_side` square pixels with the channel
    /// layout of its layer's format.
    ///
    /// # Errors
    /// * `AtlasError::ArgumentMismatch` if the file count is wrong
    /// * `AtlasError::Decode` if any file cannot be used
    /// * any error of [`allocate`](Self::allocate)
    pub fn allocate_from_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> AtlasResult<AtlasCell> {
        if paths.len() != self.formats.len() {
            return Err(AtlasError::ArgumentMismatch(format!(
                "{} files supplied for {} textures",
                paths.len(),
                self.formats.len()
            )));
        }

        let data = paths
            .iter()
            .zip(&self.formats)
            .map(|(path, &format)| {
                load_texture_file(path.as_ref(), format, self.cell_side, self.cell_side)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.allocate(&data)
    }

    /// Exposes every layer on consecutive texture units, in format order.
    ///
    /// This acts on the sink's binding state; nothing guarantees the layers stay
    /// bound after something else binds textures.
    pub fn bind(&mut self) -> S::Binding {
        self.sink.bind()
    }

    /// Side length of one cell in pixels.
    pub fn cell_side(&self) -> u32 {
        self.cell_side
    }

    /// Number of cells along each side of a layer.
    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.registry.get().len()
    }

    /// Number of cells currently owned by a handle.
    pub fn occupied(&self) -> usize {
        self.registry.get().count_ones()
    }

    /// Whether the cell at `(x, y)` is owned by a handle. Out-of-range cells are never occupied.
    pub fn is_occupied(&self, x: u32, y: u32) -> bool {
        if x >= self.cells_per_side || y >= self.cells_per_side {
            return false;
        }
        let index = (y * self.cells_per_side + x) as usize;
        self.registry.get()[index]
    }

    /// Pixel format of each layer.
    pub fn formats(&self) -> &[PixelFormat] {
        &self.formats
    }

    /// The storage the atlas writes into.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Byte length of one cell in a layer of `format`.
    fn cell_bytes(&self, format: PixelFormat) -> usize {
        self.cell_side as usize * self.cell_side as usize * format.pixel_size()
    }
}

/// Owning handle to one atlas cell.
///
/// A handle cannot be cloned: it is the single owner of its cell's occupancy bit and
/// clears it on drop. Share it between faces with `Rc<AtlasCell>`; the cell stays
/// reserved until the last `Rc` is gone. The handle does not borrow the atlas, so it
/// may outlive it harmlessly.
pub struct AtlasCell {
    /// Occupancy registry shared with the atlas
    registry: StResource<BitVec>,
    /// Cell column
    x: u32,
    /// Cell row, counted from the bottom
    y: u32,
    /// Number of cells along each side of the owning atlas
    cells_per_side: u32,
}

impl AtlasCell {
    /// Cell column.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Cell row, counted from the bottom.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Number of cells along each side of the owning atlas.
    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Registry index of the cell.
    pub fn index(&self) -> usize {
        (self.y * self.cells_per_side + self.x) as usize
    }

    /// Maps a face-local texture coordinate in `[0, 1]²` into atlas space.
    ///
    /// `(u, v)` becomes `((u + x) / n, (v + y) / n)` where `n` is the cell count per side.
    pub fn remap_uv(&self, uv: [f32; 2]) -> [f32; 2] {
        let n = self.cells_per_side as f32;
        [(uv[0] + self.x as f32) / n, (uv[1] + self.y as f32) / n]
    }
}

impl fmt::Debug for AtlasCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasCell")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("cells_per_side", &self.cells_per_side)
            .finish()
    }
}

impl Drop for AtlasCell {
    fn drop(&mut self) {
        let index = self.index();
        self.registry.get_mut().set(index, false);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    fn atlas(cells_per_side: u32) -> StreamingAtlas<MemoryTextures> {
        StreamingAtlas::with_pixel_formats(2, cells_per_side, vec![PixelFormat::R8], MemoryTextures::new())
            .unwrap()
    }

    fn cell_data(value: u8) -> [Vec<u8>; 1] {
        [vec![value; 4]]
    }

    #[test]
    fn cells_are_handed_out_in_index_order() {
        let mut atlas = atlas(2);
        let a = atlas.allocate(&cell_data(1)).unwrap();
        let b = atlas.allocate(&cell_data(2)).unwrap();
        let c = atlas.allocate(&cell_data(3)).unwrap();

        assert_eq!((a.x(), a.y()), (0, 0));
        assert_eq!((b.x(), b.y()), (1, 0));
        assert_eq!((c.x(), c.y()), (0, 1));
        assert_eq!(atlas.occupied(), 3);
    }

    #[test]
    fn data_is_uploaded_at_the_cell_origin() {
        let mut atlas = atlas(2);
        let _a = atlas.allocate(&cell_data(1)).unwrap();
        let _b = atlas.allocate(&cell_data(9)).unwrap();

        let layer = &atlas.sink().layers()[0];
        assert_eq!(layer.side, 4);
        assert_eq!(layer.pixel(2, 0), Some(&[9][..]));
        assert_eq!(layer.pixel(3, 1), Some(&[9][..]));
        assert_eq!(layer.pixel(1, 1), Some(&[1][..]));
        assert_eq!(layer.pixel(0, 2), Some(&[0][..]));
    }

    #[test]
    fn dropping_a_handle_frees_its_cell() {
        let mut atlas = atlas(2);
        let a = atlas.allocate(&cell_data(1)).unwrap();
        assert!(atlas.is_occupied(0, 0));
        drop(a);
        assert!(!atlas.is_occupied(0, 0));
        assert_eq!(atlas.occupied(), 0);
    }

    #[test]
    fn shared_handle_holds_the_cell_until_the_last_owner() {
        let mut atlas = atlas(1);
        let shared = Rc::new(atlas.allocate(&cell_data(1)).unwrap());
        let other_face = Rc::clone(&shared);

        drop(shared);
        assert!(atlas.is_occupied(0, 0));
        assert!(matches!(
            atlas.allocate(&cell_data(2)),
            Err(AtlasError::AtlasFull { capacity: 1 })
        ));

        drop(other_face);
        assert!(!atlas.is_occupied(0, 0));
        assert!(atlas.allocate(&cell_data(2)).is_ok());
    }

    #[test]
    fn wrong_buffer_count_is_rejected() {
        let mut atlas = atlas(2);
        let err = atlas.allocate(&[vec![0u8; 4], vec![0u8; 4]]).unwrap_err();
        assert!(matches!(err, AtlasError::ArgumentMismatch(_)));
        assert_eq!(atlas.occupied(), 0);
    }

    #[test]
    fn wrong_buffer_length_consumes_no_cell() {
        let mut atlas = atlas(2);
        let err = atlas.allocate(&[vec![0u8; 3]]).unwrap_err();
        assert!(matches!(err, AtlasError::ArgumentMismatch(_)));
        assert_eq!(atlas.occupied(), 0);
        assert_eq!(atlas.allocate(&cell_data(1)).unwrap().index(), 0);
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let result = StreamingAtlas::new(
            16,
            16,
            &[wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Bgra8Unorm],
            MemoryTextures::new(),
        );
        assert!(matches!(result, Err(AtlasError::UnsupportedFormat(_))));
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let result = StreamingAtlas::with_pixel_formats(0, 4, vec![PixelFormat::R8], MemoryTextures::new());
        assert!(matches!(result, Err(AtlasError::ArgumentMismatch(_))));
        let result = StreamingAtlas::with_pixel_formats(4, 4, Vec::new(), MemoryTextures::new());
        assert!(matches!(result, Err(AtlasError::ArgumentMismatch(_))));
    }

    #[test]
    fn handle_may_outlive_the_atlas() {
        let mut atlas = atlas(1);
        let cell = atlas.allocate(&cell_data(1)).unwrap();
        drop(atlas);
        assert_eq!(cell.index(), 0);
        drop(cell);
    }

    #[test]
    fn uv_remap_uses_cell_coordinates() {
        let mut atlas = atlas(4);
        let cells: Vec<AtlasCell> = (0..6).map(|_| atlas.allocate(&cell_data(0)).unwrap()).collect();
        let cell = &cells[5];
        assert_eq!((cell.x(), cell.y()), (1, 1));
        assert_eq!(cell.remap_uv([0.0, 0.0]), [0.25, 0.25]);
        assert_eq!(cell.remap_uv([1.0, 1.0]), [0.5, 0.5]);
    }
}
