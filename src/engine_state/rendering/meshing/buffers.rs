//! GPU upload of built meshes.

use wgpu::util::DeviceExt;

use crate::error::MeshResult;

use super::{mesh::index_count, BlocksMesh};

/// Label of the block vertex buffer
pub const BLOCKS_VERTEX_BUFFER: &str = "Blocks Vertex Buffer";
/// Label of the block index buffer
pub const BLOCKS_INDEX_BUFFER: &str = "Blocks Index Buffer";

/// Vertex and index buffers of an uploaded [`BlocksMesh`].
pub struct MeshBuffers {
    /// One [`BlockVertex`](crate::engine_state::rendering::BlockVertex) per mesh vertex
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` triangle list
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw
    pub index_count: u32,
}

impl BlocksMesh {
    /// Uploads the mesh into new GPU buffers.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device to create the buffers on
    ///
    /// # Errors
    /// `MeshError::IndexOverflow` if the index count does not fit a `u32` draw call.
    pub fn create_buffers(&self, device: &wgpu::Device) -> MeshResult<MeshBuffers> {
        let count = index_count(self.indices.len())?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(BLOCKS_VERTEX_BUFFER),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(BLOCKS_INDEX_BUFFER),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: count,
        })
    }
}
