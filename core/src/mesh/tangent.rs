//! Per-face tangent space for normal mapping
//!
//! The strip is read three indices at a time. Every triangle that does not
//! touch the restart marker yields one flat tangent/bitangent pair, written
//! once for each of its three corners. No smoothing across shared edges.

use glam::{Vec2, Vec3};
use tracing::debug;

use super::grid::Lattice;
use super::strip::{IndexStream, RESTART_INDEX};
use super::winding::StripWinding;

/// Tangent and bitangent streams, three entries per emitted face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TangentFrame {
    tangents: Vec<Vec3>,
    bitangents: Vec<Vec3>,
    degenerate_faces: usize,
}

impl TangentFrame {
    /// Solve the tangent basis for every complete triangle in the stream.
    ///
    /// Triangles containing the restart marker are skipped entirely. A
    /// trailing group of fewer than three indices is ignored. Faces whose
    /// UV triangle has zero area get zero vectors instead of NaN.
    pub fn build(lattice: &Lattice, indices: &IndexStream, winding: StripWinding) -> Self {
        let positions = lattice.positions();
        let uvs = lattice.uvs();
        let mut frame = Self::default();

        for (triangle_index, triangle) in indices.as_slice().chunks_exact(3).enumerate() {
            let corners = winding.triangle_corners(triangle_index);
            let vi = corners.map(|c| triangle[c]);

            if vi.contains(&RESTART_INDEX) {
                continue;
            }

            let [p0, p1, p2] = vi.map(|i| positions[i as usize]);
            let [uv0, uv1, uv2] = vi.map(|i| uvs[i as usize]);

            let (tangent, bitangent) = match solve_face(p0, p1, p2, uv0, uv1, uv2) {
                Some(basis) => basis,
                None => {
                    frame.degenerate_faces += 1;
                    (Vec3::ZERO, Vec3::ZERO)
                }
            };

            frame.tangents.extend_from_slice(&[tangent; 3]);
            frame.bitangents.extend_from_slice(&[bitangent; 3]);
        }

        debug!(
            faces = frame.face_count(),
            degenerate = frame.degenerate_faces,
            "built tangent frame"
        );

        frame
    }

    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    pub fn bitangents(&self) -> &[Vec3] {
        &self.bitangents
    }

    /// Number of entries in each stream
    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }

    /// Number of faces that contributed entries
    pub fn face_count(&self) -> usize {
        self.tangents.len() / 3
    }

    /// Faces that fell back to a zero basis
    pub fn degenerate_faces(&self) -> usize {
        self.degenerate_faces
    }

    /// Tangent and bitangent of the `face`-th emitted face
    pub fn face(&self, face: usize) -> Option<(Vec3, Vec3)> {
        let i = face.checked_mul(3)?;
        Some((*self.tangents.get(i)?, *self.bitangents.get(i)?))
    }
}

/// Solve `[d1; d2] · [T; B] = [e1; e2]` for one triangle.
///
/// Returns `None` when the UV determinant is zero or the result is not finite.
pub fn solve_face(
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    uv0: Vec2,
    uv1: Vec2,
    uv2: Vec2,
) -> Option<(Vec3, Vec3)> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let d1 = uv1 - uv0;
    let d2 = uv2 - uv0;

    let r = 1.0 / (d1.x * d2.y - d2.x * d1.y);
    if !r.is_finite() {
        return None;
    }

    let tangent = (e1 * d2.y - e2 * d1.y) * r;
    let bitangent = (e2 * d1.x - e1 * d2.x) * r;
    if !tangent.is_finite() || !bitangent.is_finite() {
        return None;
    }

    Some((tangent, bitangent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::winding::TERRAIN_WINDING;

    fn build(n: u32, scale: f32) -> (Lattice, IndexStream, TangentFrame) {
        let lattice = Lattice::generate(n, scale).unwrap();
        let indices = IndexStream::build(&lattice, TERRAIN_WINDING);
        let frame = TangentFrame::build(&lattice, &indices, TERRAIN_WINDING);
        (lattice, indices, frame)
    }

    fn complete_triangles(indices: &IndexStream) -> usize {
        indices
            .as_slice()
            .chunks_exact(3)
            .filter(|t| !t.contains(&RESTART_INDEX))
            .count()
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_output_length_matches_complete_triangles() {
        for n in [2, 3, 4, 5, 8, 21] {
            let (_, indices, frame) = build(n, 1.0);
            assert_eq!(frame.len(), 3 * complete_triangles(&indices), "n = {n}");
            assert_eq!(frame.tangents().len(), frame.bitangents().len());
        }
    }

    #[test]
    fn test_four_point_grid_skips_restart_triangles() {
        // 27 indices -> 9 triangles, three of which end on a restart marker
        let (_, _, frame) = build(4, 1.0);
        assert_eq!(frame.face_count(), 6);
        assert_eq!(frame.len(), 18);
        assert_eq!(frame.degenerate_faces(), 0);
    }

    #[test]
    fn test_first_face_basis() {
        // First triangle (4, 0, 5) is read as (4, 5, 0)
        let (_, _, frame) = build(4, 1.0);
        let (t, b) = frame.face(0).unwrap();
        assert!(approx(t, Vec3::new(2.0, 0.0, 0.0)), "tangent {t:?}");
        assert!(approx(b, Vec3::new(0.0, 0.0, 2.0)), "bitangent {b:?}");
    }

    #[test]
    fn test_corners_share_face_basis() {
        let (_, _, frame) = build(6, 3.0);
        for face in frame.tangents().chunks_exact(3) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[1], face[2]);
        }
        for face in frame.bitangents().chunks_exact(3) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[1], face[2]);
        }
    }

    #[test]
    fn test_basis_orientation_matches_uv_orientation() {
        // det[T, B, N] = r·|N|², so its sign follows the UV winding of the
        // parity-corrected triangle.
        let (lattice, indices, frame) = build(5, 2.0);
        let positions = lattice.positions();
        let uvs = lattice.uvs();
        let mut face = 0;

        for (i, tri) in indices.as_slice().chunks_exact(3).enumerate() {
            let vi = TERRAIN_WINDING.triangle_corners(i).map(|c| tri[c]);
            if vi.contains(&RESTART_INDEX) {
                continue;
            }
            let [p0, p1, p2] = vi.map(|v| positions[v as usize]);
            let [uv0, uv1, uv2] = vi.map(|v| uvs[v as usize]);
            let normal = (p1 - p0).cross(p2 - p0);
            let d1 = uv1 - uv0;
            let d2 = uv2 - uv0;
            let uv_det = d1.x * d2.y - d2.x * d1.y;

            let (t, b) = frame.face(face).unwrap();
            let basis_det = t.cross(b).dot(normal);
            assert_eq!(basis_det.signum(), uv_det.signum(), "triangle {i}");

            // Against the raw strip order the sign flips on even triangles
            let [r0, r1, r2] = [tri[0], tri[1], tri[2]].map(|v| uvs[v as usize]);
            let (q1, q2) = (r1 - r0, r2 - r0);
            let raw_det = q1.x * q2.y - q2.x * q1.y;
            let expected = if i % 2 == 0 {
                -raw_det.signum()
            } else {
                raw_det.signum()
            };
            assert_eq!(basis_det.signum(), expected, "triangle {i}, parity {}", i % 2);
            face += 1;
        }
        assert_eq!(face, frame.face_count());
    }

    #[test]
    fn test_parity_correction_orients_band_consistently() {
        // Triangles 0 (even) and 1 (odd) of the first band face the same way
        // once the corner order is corrected.
        let (lattice, indices, _) = build(4, 1.0);
        let positions = lattice.positions();
        let normals: Vec<Vec3> = indices.as_slice()[..6]
            .chunks_exact(3)
            .enumerate()
            .map(|(i, tri)| {
                let [p0, p1, p2] = TERRAIN_WINDING
                    .triangle_corners(i)
                    .map(|c| positions[tri[c] as usize]);
                (p1 - p0).cross(p2 - p0).normalize()
            })
            .collect();
        assert!(approx(normals[0], normals[1]));
    }

    #[test]
    fn test_build_counts_degenerate_faces() {
        // Row 0 of a 3×3 lattice is collinear in UV, so (0, 1, 2) has no
        // basis; (3, 0, 4) is a regular face; the third chunk touches the
        // restart marker and the lone trailing index forms no triangle.
        let lattice = Lattice::generate(3, 1.0).unwrap();
        let indices = IndexStream::from_indices(vec![0, 1, 2, 3, 0, 4, 0, RESTART_INDEX, 1, 5]);
        let frame = TangentFrame::build(&lattice, &indices, TERRAIN_WINDING);

        assert_eq!(frame.face_count(), 2);
        assert_eq!(frame.len(), 6);
        assert_eq!(frame.degenerate_faces(), 1);
        assert!(frame.tangents()[..3].iter().all(|t| *t == Vec3::ZERO));
        assert!(frame.bitangents()[..3].iter().all(|b| *b == Vec3::ZERO));

        let (t, b) = frame.face(1).unwrap();
        assert!(t.length() > 0.0 && t.is_finite());
        assert!(b.length() > 0.0 && b.is_finite());
        assert!(frame.tangents().iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_degenerate_uv_yields_zero_basis() {
        let p = [Vec3::ZERO, Vec3::X, Vec3::Z];
        let uv = Vec2::new(0.25, 0.25);
        assert_eq!(solve_face(p[0], p[1], p[2], uv, uv, uv), None);

        // Collinear UVs
        let basis = solve_face(
            p[0],
            p[1],
            p[2],
            Vec2::ZERO,
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 1.0),
        );
        assert_eq!(basis, None);
    }

    #[test]
    fn test_solve_face_unit_square() {
        let (t, b) = solve_face(
            Vec3::ZERO,
            Vec3::X,
            Vec3::Z,
            Vec2::ZERO,
            Vec2::X,
            Vec2::Y,
        )
        .unwrap();
        assert!(approx(t, Vec3::X));
        assert!(approx(b, Vec3::Z));
    }
}
