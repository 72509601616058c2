//! The single hard-coded pyramid mesh and its GPU upload.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One mesh vertex: three contiguous floats, no normalization, tight stride.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Base triangle plus apex. The vertex colors in the shader derive from these
/// positions, so the coordinates double as the color palette.
pub const PYRAMID_VERTICES: [Vertex; 4] = [
    Vertex { position: [-1.0, -1.0, 0.0] },
    Vertex { position: [0.0, -1.0, 1.0] },
    Vertex { position: [1.0, -1.0, 0.0] },
    Vertex { position: [1.0, 1.0, 0.0] },
];

/// Four triangles: three sides sharing the apex (vertex 3) and the base.
pub const PYRAMID_INDICES: [u32; 12] = [
    0, 3, 1, //
    1, 3, 2, //
    2, 3, 0, //
    0, 1, 2,
];

/// GPU-resident copy of the pyramid, immutable once uploaded.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    /// Uploads the static vertex and index buffers.
    pub fn upload(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pyramid vertices"),
            contents: bytemuck::cast_slice(&PYRAMID_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pyramid indices"),
            contents: bytemuck::cast_slice(&PYRAMID_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: PYRAMID_INDICES.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_is_four_vertices_and_four_triangles() {
        assert_eq!(PYRAMID_VERTICES.len(), 4);
        assert_eq!(PYRAMID_INDICES.len(), 12);
        assert_eq!(PYRAMID_INDICES.chunks_exact(3).count(), 4);
    }

    #[test]
    fn indices_reference_existing_vertices() {
        for index in PYRAMID_INDICES {
            assert!((index as usize) < PYRAMID_VERTICES.len());
        }
    }

    #[test]
    fn triangles_are_non_degenerate() {
        for triangle in PYRAMID_INDICES.chunks_exact(3) {
            assert_ne!(triangle[0], triangle[1]);
            assert_ne!(triangle[1], triangle[2]);
            assert_ne!(triangle[2], triangle[0]);
        }
    }

    #[test]
    fn apex_is_shared_by_exactly_three_sides() {
        let apex_triangles = PYRAMID_INDICES
            .chunks_exact(3)
            .filter(|triangle| triangle.contains(&3))
            .count();
        assert_eq!(apex_triangles, 3);
    }

    #[test]
    fn vertex_stride_matches_attribute_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 12);
        assert_eq!(
            Vertex::layout().array_stride,
            std::mem::size_of::<Vertex>() as wgpu::BufferAddress
        );
    }
}
