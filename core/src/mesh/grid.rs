//! Flat terrain lattice
//!
//! Generates an N×N grid of points over `[-scale, +scale]` on X and Z.
//! Height stays at zero; the height map displaces vertices on the GPU.

use glam::{Vec2, Vec3};

use super::strip::RESTART_INDEX;
use crate::error::MeshError;

/// One lattice point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

/// Row-major grid of terrain vertices
///
/// Rows advance along X, columns along Z. Positions and UVs are kept in
/// separate arrays because the rasterizer binds them as separate streams.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    point_count: u32,
    world_scale: f32,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
}

impl Lattice {
    /// Generate the lattice for `point_count × point_count` vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if `point_count < 2`, `world_scale` is not strictly
    /// positive, or the vertex count would reach the strip restart index.
    pub fn generate(point_count: u32, world_scale: f32) -> Result<Self, MeshError> {
        validate(point_count, world_scale)?;

        let n = point_count as usize;
        let span = (point_count - 1) as f32;
        let mut positions = Vec::with_capacity(n * n);
        let mut uvs = Vec::with_capacity(n * n);

        for i in 0..point_count {
            let x = world_scale * (i as f32 / span - 0.5) * 2.0;
            for j in 0..point_count {
                let z = world_scale * (j as f32 / span - 0.5) * 2.0;
                positions.push(Vec3::new(x, 0.0, z));
                // Half-texel offset keeps samples centred on height map texels
                uvs.push(Vec2::new(
                    (i as f32 + 0.5) / span,
                    (j as f32 + 0.5) / span,
                ));
            }
        }

        Ok(Self {
            point_count,
            world_scale,
            positions,
            uvs,
        })
    }

    /// Points along one edge
    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    pub fn world_scale(&self) -> f32 {
        self.world_scale
    }

    /// Total number of vertices (`point_count²`)
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Vertex at lattice coordinate `(row, col)`, if in range
    pub fn vertex(&self, row: u32, col: u32) -> Option<Vertex> {
        if row >= self.point_count || col >= self.point_count {
            return None;
        }
        let index = (row * self.point_count + col) as usize;
        Some(Vertex {
            position: self.positions[index],
            uv: self.uvs[index],
        })
    }
}

fn validate(point_count: u32, world_scale: f32) -> Result<(), MeshError> {
    if point_count < 2 {
        return Err(MeshError::PointCountTooSmall { point_count });
    }
    // Also rejects NaN
    if !(world_scale > 0.0) {
        return Err(MeshError::NonPositiveScale { world_scale });
    }
    let vertex_count = u64::from(point_count) * u64::from(point_count);
    if vertex_count >= u64::from(RESTART_INDEX) {
        return Err(MeshError::IndexOverflow { point_count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_vertex_count() {
        for n in [2, 3, 4, 17, 64] {
            let lattice = Lattice::generate(n, 1.0).unwrap();
            assert_eq!(lattice.len(), (n * n) as usize);
            assert_eq!(lattice.positions().len(), lattice.uvs().len());
        }
    }

    #[test]
    fn test_lattice_covers_scale_on_both_axes() {
        let lattice = Lattice::generate(5, 2.5).unwrap();
        let first = lattice.vertex(0, 0).unwrap().position;
        let last = lattice.vertex(4, 4).unwrap().position;
        assert_eq!(first, Vec3::new(-2.5, 0.0, -2.5));
        assert_eq!(last, Vec3::new(2.5, 0.0, 2.5));
        assert!(lattice.positions().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_lattice_is_row_major_along_x() {
        let lattice = Lattice::generate(3, 1.0).unwrap();
        // Consecutive entries advance along Z within a row
        assert_eq!(lattice.positions()[0], Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(lattice.positions()[1], Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(lattice.positions()[3], Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_uv_half_texel_offset() {
        let lattice = Lattice::generate(4, 1.0).unwrap();
        let uv = lattice.vertex(0, 0).unwrap().uv;
        assert_eq!(uv, Vec2::new(0.5 / 3.0, 0.5 / 3.0));
        let uv = lattice.vertex(1, 2).unwrap().uv;
        assert_eq!(uv, Vec2::new(1.5 / 3.0, 2.5 / 3.0));
    }

    #[test]
    fn test_uv_components_are_non_negative() {
        let lattice = Lattice::generate(16, 1.0).unwrap();
        assert!(lattice.uvs().iter().all(|uv| uv.x >= 0.0 && uv.y >= 0.0));
    }

    #[test]
    fn test_last_row_uv_overshoots_by_half_texel() {
        // The offset pushes the far edge half a cell past 1.0; the height
        // map sampler clamps there.
        let lattice = Lattice::generate(4, 1.0).unwrap();
        let uv = lattice.vertex(3, 3).unwrap().uv;
        assert!((uv.x - 3.5 / 3.0).abs() < 1e-6);
        assert!((uv.y - 3.5 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_out_of_range() {
        let lattice = Lattice::generate(3, 1.0).unwrap();
        assert!(lattice.vertex(3, 0).is_none());
        assert!(lattice.vertex(0, 3).is_none());
    }

    #[test]
    fn test_rejects_small_point_count() {
        assert_eq!(
            Lattice::generate(1, 1.0),
            Err(MeshError::PointCountTooSmall { point_count: 1 })
        );
        assert!(Lattice::generate(0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(matches!(
            Lattice::generate(4, 0.0),
            Err(MeshError::NonPositiveScale { .. })
        ));
        assert!(Lattice::generate(4, -1.0).is_err());
        assert!(Lattice::generate(4, f32::NAN).is_err());
    }

    #[test]
    fn test_rejects_index_overflow() {
        assert_eq!(
            Lattice::generate(65_536, 1.0),
            Err(MeshError::IndexOverflow { point_count: 65_536 })
        );
    }
}
