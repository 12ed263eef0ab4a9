//! Per-frame shader uniforms

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::CameraRig;
use crate::mesh::TerrainMesh;
use crate::scene::SceneParameterStore;

/// Uniform block shared with `terrain.wgsl`
///
/// Field order and padding match the WGSL struct layout (224 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// projection · view · model
    pub mvp: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// Always identity for the single static mesh
    pub model: [[f32; 4]; 4],
    /// World space
    pub light_direction: [f32; 3],
    pub height_map_scale: f32,
    /// Points per edge minus one
    pub n_points: f32,
    /// 1 when normal visualization is on
    pub normal_mode: u32,
    /// Terrain half-width, used to derive neighbour spacing for normals
    pub world_scale: f32,
    pub _padding: u32,
}

impl FrameUniforms {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn assemble(camera: &CameraRig, scene: &SceneParameterStore, mesh: &TerrainMesh) -> Self {
        let model = Mat4::IDENTITY;
        let view = camera.view();
        let mvp = camera.projection() * view * model;

        Self {
            mvp: mvp.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            light_direction: scene.light_direction().to_array(),
            height_map_scale: scene.height_scale(),
            n_points: mesh.n_points_uniform(),
            normal_mode: u32::from(scene.normal_visualization()),
            world_scale: mesh.lattice().world_scale(),
            _padding: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
