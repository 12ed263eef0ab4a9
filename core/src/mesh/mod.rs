//! Procedural terrain mesh
//!
//! Builds the immutable mesh package the renderer uploads once at startup:
//!
//! 1. [`Lattice`] - flat N×N grid with half-texel UVs
//! 2. [`IndexStream`] - one triangle strip with restart markers between bands
//! 3. [`TangentFrame`] - flat per-face tangent/bitangent pairs
//!
//! All three stages share the [`TERRAIN_WINDING`] convention.

mod grid;
mod strip;
mod tangent;
mod winding;

use tracing::info;

pub use grid::{Lattice, Vertex};
pub use strip::{IndexStream, RESTART_INDEX};
pub use tangent::{TangentFrame, solve_face};
pub use winding::{FrontFace, StripWinding, TERRAIN_WINDING};

use crate::error::MeshError;

/// Everything the rasterizer needs to draw the terrain
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    lattice: Lattice,
    indices: IndexStream,
    tangents: TangentFrame,
    winding: StripWinding,
}

impl TerrainMesh {
    /// Generate the full mesh package.
    ///
    /// # Errors
    ///
    /// Fails if the lattice preconditions are not met (see [`Lattice::generate`]).
    pub fn generate(point_count: u32, world_scale: f32) -> Result<Self, MeshError> {
        let winding = TERRAIN_WINDING;
        let lattice = Lattice::generate(point_count, world_scale)?;
        let indices = IndexStream::build(&lattice, winding);
        let tangents = TangentFrame::build(&lattice, &indices, winding);

        info!(
            "Generated terrain mesh: {} vertices, {} indices, {} faces ({} degenerate)",
            lattice.len(),
            indices.len(),
            tangents.face_count(),
            tangents.degenerate_faces()
        );

        Ok(Self {
            lattice,
            indices,
            tangents,
            winding,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn indices(&self) -> &IndexStream {
        &self.indices
    }

    pub fn tangents(&self) -> &TangentFrame {
        &self.tangents
    }

    pub fn winding(&self) -> StripWinding {
        self.winding
    }

    pub fn point_count(&self) -> u32 {
        self.lattice.point_count()
    }

    pub fn face_count(&self) -> usize {
        self.tangents.face_count()
    }

    pub fn degenerate_faces(&self) -> usize {
        self.tangents.degenerate_faces()
    }

    /// Value of the `nPoints` shader uniform (cells along one edge)
    pub fn n_points_uniform(&self) -> f32 {
        (self.lattice.point_count() - 1) as f32
    }

    /// Tangent stream zero-padded so every lattice vertex has an entry.
    pub fn padded_tangents(&self) -> Vec<glam::Vec3> {
        pad_to(self.tangents.tangents(), self.lattice.len())
    }

    /// Bitangent stream zero-padded so every lattice vertex has an entry.
    pub fn padded_bitangents(&self) -> Vec<glam::Vec3> {
        pad_to(self.tangents.bitangents(), self.lattice.len())
    }
}

fn pad_to(stream: &[glam::Vec3], len: usize) -> Vec<glam::Vec3> {
    let mut padded = stream.to_vec();
    if padded.len() < len {
        padded.resize(len, glam::Vec3::ZERO);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_propagates_precondition_errors() {
        assert!(matches!(
            TerrainMesh::generate(1, 5.0),
            Err(MeshError::PointCountTooSmall { .. })
        ));
    }

    #[test]
    fn test_n_points_uniform() {
        let mesh = TerrainMesh::generate(200, 5.0).unwrap();
        assert_eq!(mesh.n_points_uniform(), 199.0);
    }

    #[test]
    fn test_padded_streams_cover_lattice() {
        // Small grids emit fewer tangent entries than vertices
        let mesh = TerrainMesh::generate(4, 1.0).unwrap();
        assert_eq!(mesh.tangents().len(), 18);
        assert_eq!(mesh.padded_tangents().len(), 18);

        let mesh = TerrainMesh::generate(2, 1.0).unwrap();
        assert_eq!(mesh.tangents().len(), 3);
        assert_eq!(mesh.padded_tangents().len(), mesh.lattice().len());
        assert_eq!(mesh.padded_bitangents().len(), mesh.lattice().len());
        assert_eq!(*mesh.padded_tangents().last().unwrap(), glam::Vec3::ZERO);
    }

    #[test]
    fn test_default_size_mesh_counts() {
        let mesh = TerrainMesh::generate(200, 5.0).unwrap();
        assert_eq!(mesh.lattice().len(), 40_000);
        assert_eq!(mesh.indices().len(), 199 * 401);
        assert_eq!(mesh.indices().restart_count(), 199);
        assert_eq!(mesh.degenerate_faces(), 0);
        assert!(mesh.padded_tangents().len() >= mesh.lattice().len());
    }
}
