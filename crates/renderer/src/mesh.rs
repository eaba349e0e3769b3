//! Mesh upload from the raw loader contract.

use crate::vertex::Vertex;
use anyhow::{ensure, Result};
use wgpu::util::DeviceExt;

/// The contract an external mesh source fulfils: counts plus raw bytes.
/// Vertices follow the [`Vertex`] layout; indices are unsigned 32-bit.
#[derive(Debug, Clone, Copy)]
pub struct MeshBuffers<'a> {
    pub vertex_count: u32,
    pub index_count: u32,
    pub vertex_bytes: &'a [u8],
    pub index_bytes: &'a [u8],
}

/// A GPU mesh with vertex and index buffers. Immutable after upload.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from typed vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    /// Upload a mesh from the raw loader contract, checking that the byte
    /// buffers are consistent with the declared counts before touching the
    /// GPU.
    pub fn from_raw_parts(device: &wgpu::Device, source: MeshBuffers<'_>) -> Result<Self> {
        let vertex_stride = std::mem::size_of::<Vertex>();
        ensure!(
            source.vertex_bytes.len() == source.vertex_count as usize * vertex_stride,
            "vertex buffer is {} bytes, expected {} vertices x {} bytes",
            source.vertex_bytes.len(),
            source.vertex_count,
            vertex_stride,
        );
        ensure!(
            source.index_bytes.len() == source.index_count as usize * std::mem::size_of::<u32>(),
            "index buffer is {} bytes, expected {} u32 indices",
            source.index_bytes.len(),
            source.index_count,
        );
        ensure!(
            source.index_count % 3 == 0,
            "index count {} is not a whole number of triangles",
            source.index_count,
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dome Vertex Buffer"),
            contents: source.vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dome Index Buffer"),
            contents: source.index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            num_indices: source.index_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract validation is pure arithmetic; exercise it without a device
    /// by checking the same invariants `from_raw_parts` enforces.
    #[test]
    fn raw_contract_arithmetic() {
        let vertices = [
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        let indices: [u32; 3] = [0, 1, 2];
        let source = MeshBuffers {
            vertex_count: 3,
            index_count: 3,
            vertex_bytes: bytemuck::cast_slice(&vertices),
            index_bytes: bytemuck::cast_slice(&indices),
        };
        assert_eq!(
            source.vertex_bytes.len(),
            source.vertex_count as usize * std::mem::size_of::<Vertex>()
        );
        assert_eq!(
            source.index_bytes.len(),
            source.index_count as usize * std::mem::size_of::<u32>()
        );
        assert_eq!(source.index_count % 3, 0);
    }
}
