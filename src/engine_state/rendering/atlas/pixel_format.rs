//! # Pixel Format Module
//!
//! The small set of texel layouts a streaming atlas layer can hold.

use phf::phf_map;

use crate::error::{AtlasError, AtlasResult};

/// Texel layout of one atlas layer.
///
/// Every format is 8 bits per channel. Rows of cell data are tightly packed,
/// bottom row first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single red channel.
    R8,
    /// Red and green channels.
    Rg8,
    /// Linear RGBA.
    Rgba8,
    /// sRGB-encoded RGBA.
    Rgba8Srgb,
}

/// Names accepted in configuration files.
static PIXEL_FORMAT_NAMES: phf::Map<&'static str, PixelFormat> = phf_map! {
    "r8" => PixelFormat::R8,
    "rg8" => PixelFormat::Rg8,
    "rgba8" => PixelFormat::Rgba8,
    "rgba8_srgb" => PixelFormat::Rgba8Srgb,
};

impl PixelFormat {
    /// Looks up a format by its configuration name (`"r8"`, `"rg8"`, `"rgba8"`, `"rgba8_srgb"`).
    ///
    /// # Errors
    /// `AtlasError::UnsupportedFormat` if the name is not one of the above.
    pub fn from_name(name: &str) -> AtlasResult<Self> {
        PIXEL_FORMAT_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| AtlasError::UnsupportedFormat(name.to_string()))
    }

    /// Number of bytes one pixel occupies.
    pub fn pixel_size(self) -> usize {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rg8 => 2,
            PixelFormat::Rgba8 | PixelFormat::Rgba8Srgb => 4,
        }
    }

    /// The GPU texture format backing a layer of this format.
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
            PixelFormat::Rg8 => wgpu::TextureFormat::Rg8Unorm,
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::Rgba8Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }

    /// The decoded image color type a texture file must have to fill a cell of this format.
    pub fn color_type(self) -> image::ColorType {
        match self {
            PixelFormat::R8 => image::ColorType::L8,
            PixelFormat::Rg8 => image::ColorType::La8,
            PixelFormat::Rgba8 | PixelFormat::Rgba8Srgb => image::ColorType::Rgba8,
        }
    }
}

impl TryFrom<wgpu::TextureFormat> for PixelFormat {
    type Error = AtlasError;

    fn try_from(format: wgpu::TextureFormat) -> AtlasResult<Self> {
        match format {
            wgpu::TextureFormat::R8Unorm => Ok(PixelFormat::R8),
            wgpu::TextureFormat::Rg8Unorm => Ok(PixelFormat::Rg8),
            wgpu::TextureFormat::Rgba8Unorm => Ok(PixelFormat::Rgba8),
            wgpu::TextureFormat::Rgba8UnormSrgb => Ok(PixelFormat::Rgba8Srgb),
            other => Err(AtlasError::UnsupportedFormat(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve() {
        assert_eq!(PixelFormat::from_name("rgba8").unwrap(), PixelFormat::Rgba8);
        assert_eq!(PixelFormat::from_name("r8").unwrap(), PixelFormat::R8);
        assert!(matches!(
            PixelFormat::from_name("rgb8"),
            Err(AtlasError::UnsupportedFormat(name)) if name == "rgb8"
        ));
    }

    #[test]
    fn wgpu_formats_round_trip() {
        for format in [
            PixelFormat::R8,
            PixelFormat::Rg8,
            PixelFormat::Rgba8,
            PixelFormat::Rgba8Srgb,
        ] {
            assert_eq!(PixelFormat::try_from(format.texture_format()).unwrap(), format);
        }
        assert!(PixelFormat::try_from(wgpu::TextureFormat::Bgra8Unorm).is_err());
        assert!(PixelFormat::try_from(wgpu::TextureFormat::Depth32Float).is_err());
    }

    #[test]
    fn pixel_sizes() {
        assert_eq!(PixelFormat::R8.pixel_size(), 1);
        assert_eq!(PixelFormat::Rg8.pixel_size(), 2);
        assert_eq!(PixelFormat::Rgba8Srgb.pixel_size(), 4);
    }
}
