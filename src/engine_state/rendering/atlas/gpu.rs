//! WebGPU-backed storage for atlas layers.
//!
//! Each atlas format becomes one [`Texture`]; cell uploads go through
//! `Queue::write_texture`, and binding builds a bind group that places layer `i`
//! at binding `i` with a shared sampler after the last layer.

use wgpu::{BindGroup, BindGroupLayout, Device, Queue};

use crate::engine_state::rendering::texture::Texture;

use super::{PixelFormat, TextureSink};

/// Label of the atlas bind group layout
pub const ATLAS_BIND_GROUP_LAYOUT: &str = "atlas_bind_group_layout";
/// Label of the atlas bind group
pub const ATLAS_BIND_GROUP: &str = "atlas_bind_group";

/// Texture sink that stores atlas layers in GPU textures.
pub struct WgpuTextures<'a> {
    /// The WebGPU device used to create textures and bind groups
    device: &'a Device,
    /// The queue cell uploads are written through
    queue: &'a Queue,
    /// One texture per atlas format, in format order
    layers: Vec<Texture>,
    /// Format of each layer
    formats: Vec<PixelFormat>,
    /// Layout of the most recent bind group, kept for pipeline creation
    bind_group_layout: Option<BindGroupLayout>,
}

impl<'a> WgpuTextures<'a> {
    /// Creates a sink that will allocate its layers on `device`.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for texture uploads
    pub fn new(device: &'a Device, queue: &'a Queue) -> Self {
        Self {
            device,
            queue,
            layers: Vec::new(),
            formats: Vec::new(),
            bind_group_layout: None,
        }
    }

    /// The GPU textures backing the atlas, in format order.
    pub fn layers(&self) -> &[Texture] {
        &self.layers
    }

    /// The layout of the last bind group produced by `bind`, if any.
    pub fn bind_group_layout(&self) -> Option<&BindGroupLayout> {
        self.bind_group_layout.as_ref()
    }
}

impl TextureSink for WgpuTextures<'_> {
    type Binding = BindGroup;

    fn create_layers(&mut self, formats: &[PixelFormat], side: u32) {
        self.layers = formats
            .iter()
            .enumerate()
            .map(|(i, &format)| {
                Texture::create_atlas_layer(self.device, side, format, &format!("Atlas Layer {i}"))
            })
            .collect();
        self.formats = formats.to_vec();
    }

    fn write_cell(&mut self, layer: usize, origin: [u32; 2], cell_side: u32, data: &[u8]) {
        let bytes_per_row = cell_side * self.formats[layer].pixel_size() as u32;

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.layers[layer].texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: origin[0],
                    y: origin[1],
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(cell_side),
            },
            wgpu::Extent3d {
                width: cell_side,
                height: cell_side,
                depth_or_array_layers: 1,
            },
        );
    }

    fn bind(&mut self) -> Self::Binding {
        let sampler_binding = self.layers.len() as u32;

        let mut layout_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..sampler_binding)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            })
            .collect();
        layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding: sampler_binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            // This should match the filterable field of the texture entries above.
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &layout_entries,
                label: Some(ATLAS_BIND_GROUP_LAYOUT),
            });

        let mut entries: Vec<wgpu::BindGroupEntry> = self
            .layers
            .iter()
            .zip(0..)
            .map(|(layer, binding)| wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&layer.view),
            })
            .collect();
        if let Some(first) = self.layers.first() {
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding,
                resource: wgpu::BindingResource::Sampler(&first.sampler),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &entries,
            label: Some(ATLAS_BIND_GROUP),
        });

        self.bind_group_layout = Some(layout);
        bind_group
    }
}
