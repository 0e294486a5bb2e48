//! Texture handling for the block atlas.
//!
//! This module provides the GPU-side image that backs one atlas layer and the
//! PNG decoder that turns a texture file into cell pixels.

use std::path::Path;

use image::ImageFormat;

use crate::error::DecodeError;

use super::atlas::PixelFormat;

/// Represents a GPU texture with associated view and sampler.
///
/// One `Texture` backs one layer of a streaming atlas. Its storage is fixed at creation:
/// a single mip level, never resized.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Creates a square atlas layer.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `side` - Width and height in pixels
    /// * `format` - Texel layout of the layer
    /// * `label` - Debug label for the texture
    ///
    /// # Returns
    /// A new `Texture` that can receive `write_texture` uploads and be sampled
    pub fn create_atlas_layer(
        device: &wgpu::Device,
        side: u32,
        format: PixelFormat,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: side,
            height: side,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Cells sit edge to edge, so nothing may bleed across a cell border.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Loads a PNG file whose size and layout must match `format` exactly.
///
/// # Arguments
/// * `path` - The PNG file
/// * `format` - The pixel format of the atlas layer the data is destined for
/// * `width`, `height` - The exact required dimensions
///
/// # Returns
/// Tightly packed pixels with the bottom image row first, the order atlas uploads use.
///
/// # Errors
/// A [`DecodeError`] if the file is missing, not a PNG, the wrong size, or
/// does not have the 8-bit channel layout of `format`.
pub fn load_texture_file(
    path: &Path,
    format: PixelFormat,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|source| {
        DecodeError::Image {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if image.width() != width || image.height() != height {
        return Err(DecodeError::Dimensions {
            path: path.to_path_buf(),
            width: image.width(),
            height: image.height(),
            expected_width: width,
            expected_height: height,
        });
    }

    if image.color() != format.color_type() {
        return Err(DecodeError::ColorType {
            path: path.to_path_buf(),
            found: image.color(),
            expected: format.color_type(),
        });
    }

    // PNG rows run top to bottom; atlas cells are filled bottom to top.
    Ok(image.flipv().into_bytes())
}
