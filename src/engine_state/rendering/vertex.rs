//! Vertex data structures and layouts for block rendering.
//!
//! This module defines the vertex format shared by block face definitions and the
//! meshes built from them, and the matching WebGPU buffer layout.

/// A vertex of a block face.
///
/// Face definitions hold these in block-local space (the unit cube centered on the
/// origin, so coordinates on a cube face are ±0.5). The mesh builder copies them
/// and translates the position into world space; every other field is already final.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes), atlas space once the face is defined
/// - Atlas Cell: [u32; 2] (8 bytes)
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockVertex {
    /// Position
    pub position: [f32; 3],
    /// Outward normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Column and row of the atlas cell the face samples from
    pub cell: [u32; 2],
}

impl BlockVertex {
    /// Creates a vertex with a face-local texture coordinate and no atlas cell yet.
    ///
    /// # Arguments
    /// * `position` - Block-local position
    /// * `normal` - Outward normal
    /// * `uv` - Texture coordinate in `[0, 1]²`
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        BlockVertex {
            position,
            normal,
            uv,
            cell: [0, 0],
        }
    }

    /// Returns a copy moved by `offset`.
    pub fn translated(&self, offset: [f32; 3]) -> Self {
        BlockVertex {
            position: [
                self.position[0] + offset[0],
                self.position[1] + offset[1],
                self.position[2] + offset[2],
            ],
            ..*self
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: tex_coords (vec2<f32>)
    /// - `location = 3`: cell (vec2<u32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlockVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Uint32x2,
                },
            ],
        }
    }
}
