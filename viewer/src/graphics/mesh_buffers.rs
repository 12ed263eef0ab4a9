//! GPU copies of the terrain mesh

use terrain_core::TerrainMesh;
use wgpu::util::DeviceExt;

/// Shader locations of the four vertex streams
pub const POSITION_LOCATION: u32 = 0;
pub const UV_LOCATION: u32 = 1;
pub const TANGENT_LOCATION: u32 = 2;
pub const BITANGENT_LOCATION: u32 = 3;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![POSITION_LOCATION => Float32x3];
const UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![UV_LOCATION => Float32x2];
const TANGENT_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![TANGENT_LOCATION => Float32x3];
const BITANGENT_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![BITANGENT_LOCATION => Float32x3];

const VEC3_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
const VEC2_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;

/// One buffer layout per stream, in slot order
pub fn vertex_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 4] {
    [
        wgpu::VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: VEC2_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &UV_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &TANGENT_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &BITANGENT_ATTRIBUTES,
        },
    ]
}

/// Vertex streams and the strip index buffer
pub struct MeshBuffers {
    positions: wgpu::Buffer,
    uvs: wgpu::Buffer,
    tangents: wgpu::Buffer,
    bitangents: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, mesh: &TerrainMesh) -> Self {
        let lattice = mesh.lattice();
        let tangents = mesh.padded_tangents();
        let bitangents = mesh.padded_bitangents();
        let indices = mesh.indices().as_slice();

        let positions = create_vertex_buffer(
            device,
            "Terrain Positions",
            bytemuck::cast_slice(lattice.positions()),
        );
        let uvs = create_vertex_buffer(device, "Terrain UVs", bytemuck::cast_slice(lattice.uvs()));
        let tangents =
            create_vertex_buffer(device, "Terrain Tangents", bytemuck::cast_slice(&tangents));
        let bitangents =
            create_vertex_buffer(device, "Terrain Bitangents", bytemuck::cast_slice(&bitangents));
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Strip Indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            "Uploaded terrain mesh: {} vertices, {} indices",
            lattice.len(),
            indices.len()
        );

        Self {
            positions,
            uvs,
            tangents,
            bitangents,
            indices: index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Bind all streams and draw the strip
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.uvs.slice(..));
        pass.set_vertex_buffer(2, self.tangents.slice(..));
        pass.set_vertex_buffer(3, self.bitangents.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::VERTEX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_locations_are_sequential() {
        let layouts = vertex_buffer_layouts();
        for (slot, layout) in layouts.iter().enumerate() {
            assert_eq!(layout.attributes.len(), 1);
            assert_eq!(layout.attributes[0].shader_location, slot as u32);
            assert_eq!(layout.attributes[0].offset, 0);
        }
    }

    #[test]
    fn test_stream_strides() {
        let layouts = vertex_buffer_layouts();
        assert_eq!(layouts[0].array_stride, 12);
        assert_eq!(layouts[1].array_stride, 8);
        assert_eq!(layouts[2].array_stride, 12);
        assert_eq!(layouts[3].array_stride, 12);
    }

    #[test]
    fn test_streams_cover_every_indexed_vertex() {
        let mesh = TerrainMesh::generate(5, 1.0).unwrap();
        let max_index = mesh
            .indices()
            .as_slice()
            .iter()
            .copied()
            .filter(|&i| i != terrain_core::RESTART_INDEX)
            .max()
            .unwrap() as usize;
        assert!(mesh.padded_tangents().len() > max_index);
        assert!(mesh.padded_bitangents().len() > max_index);
    }
}
