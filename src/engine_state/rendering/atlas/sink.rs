//! # Texture Sink Module
//!
//! The seam between the atlas allocator and whatever stores the texel data.
//! The allocator decides *where* a cell goes; a sink only receives layer creation,
//! sub-rectangle writes and bind requests, and never reports anything back.

use std::ops::Range;

use super::PixelFormat;

/// Receiver of atlas image storage operations.
///
/// Layers are addressed by their position in the atlas format list. Pixel data handed to
/// [`write_cell`](TextureSink::write_cell) is tightly packed, bottom row first, and exactly
/// `cell_side * cell_side * format.pixel_size()` bytes long.
pub trait TextureSink {
    /// What a bind call produces (for example a GPU bind group).
    type Binding;

    /// Creates one square image of `side` pixels per format, in order.
    fn create_layers(&mut self, formats: &[PixelFormat], side: u32);

    /// Writes a square block of `cell_side` pixels at `origin` into layer `layer`.
    ///
    /// # Panics
    /// May panic if `layer` does not exist or the block does not fit inside the layer.
    /// The atlas only issues writes for cells it has validated.
    fn write_cell(&mut self, layer: usize, origin: [u32; 2], cell_side: u32, data: &[u8]);

    /// Exposes all layers on consecutive texture units, layer `i` on unit `i`.
    fn bind(&mut self) -> Self::Binding;
}

/// A CPU-side copy of one atlas layer.
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    /// Texel layout of the layer.
    pub format: PixelFormat,
    /// Width and height in pixels.
    pub side: u32,
    /// Packed pixels, bottom row first.
    pub pixels: Vec<u8>,
}

impl MemoryLayer {
    /// Returns the bytes of the pixel at `(x, y)`, counted from the bottom-left,
    /// or `None` outside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.side || y >= self.side {
            return None;
        }
        let size = self.format.pixel_size();
        let start = (y as usize * self.side as usize + x as usize) * size;
        self.pixels.get(start..start + size)
    }
}

/// Texture sink that keeps every layer in memory.
///
/// Used when no GPU adapter is available and by tests that inspect what the atlas wrote.
#[derive(Debug, Default)]
pub struct MemoryTextures {
    layers: Vec<MemoryLayer>,
    bind_count: usize,
}

impl MemoryTextures {
    /// Creates an empty sink; the atlas creates its layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// All layers, in atlas format order.
    pub fn layers(&self) -> &[MemoryLayer] {
        &self.layers
    }

    /// How many times the atlas has been bound.
    pub fn bind_count(&self) -> usize {
        self.bind_count
    }
}

impl TextureSink for MemoryTextures {
    type Binding = Range<u32>;

    fn create_layers(&mut self, formats: &[PixelFormat], side: u32) {
        self.layers = formats
            .iter()
            .map(|&format| MemoryLayer {
                format,
                side,
                pixels: vec![0; side as usize * side as usize * format.pixel_size()],
            })
            .collect();
    }

    fn write_cell(&mut self, layer: usize, origin: [u32; 2], cell_side: u32, data: &[u8]) {
        let layer = &mut self.layers[layer];
        let pixel_size = layer.format.pixel_size();
        let row_len = cell_side as usize * pixel_size;
        let side = layer.side as usize;

        for (row, src) in data.chunks_exact(row_len).enumerate() {
            let y = origin[1] as usize + row;
            let start = (y * side + origin[0] as usize) * pixel_size;
            layer.pixels[start..start + row_len].copy_from_slice(src);
        }
    }

    fn bind(&mut self) -> Self::Binding {
        self.bind_count += 1;
        0..self.layers.len() as u32
    }
}
