//! Triangle-strip index stream with primitive restart
//!
//! Each band between two lattice rows becomes one zig-zag strip. Bands are
//! separated by [`RESTART_INDEX`] so the whole grid draws in a single call.

use super::grid::Lattice;
use super::winding::StripWinding;

/// Primitive-restart marker for 32-bit index buffers
pub const RESTART_INDEX: u32 = u32::MAX;

/// Single triangle strip covering the whole lattice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStream {
    indices: Vec<u32>,
}

impl IndexStream {
    /// Walk the lattice band by band.
    ///
    /// For `N` points per edge this yields `N-1` bands of `2N` indices, each
    /// followed by a restart marker (including the last band).
    pub fn build(lattice: &Lattice, winding: StripWinding) -> Self {
        let n = lattice.point_count();
        let band_len = 2 * n as usize + 1;
        let mut indices = Vec::with_capacity((n as usize - 1) * band_len);

        for row in 0..n - 1 {
            for col in 0..n {
                let top_left = row * n + col;
                let bottom_left = top_left + n;
                indices.extend_from_slice(&winding.column_pair(top_left, bottom_left));
            }
            indices.push(RESTART_INDEX);
        }

        Self { indices }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of restart markers in the stream
    pub fn restart_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i == RESTART_INDEX).count()
    }

    /// Wrap a hand-built stream
    #[cfg(test)]
    pub(super) fn from_indices(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    /// Expected stream length for `point_count` points per edge
    pub fn expected_len(point_count: u32) -> usize {
        let n = point_count as usize;
        n.saturating_sub(1) * (2 * n + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::winding::TERRAIN_WINDING;

    fn stream(n: u32) -> IndexStream {
        let lattice = Lattice::generate(n, 1.0).unwrap();
        IndexStream::build(&lattice, TERRAIN_WINDING)
    }

    #[test]
    fn test_stream_length_and_restart_count() {
        for n in [2, 3, 4, 10, 33] {
            let s = stream(n);
            assert_eq!(s.len(), IndexStream::expected_len(n));
            assert_eq!(s.restart_count(), (n - 1) as usize);
        }
    }

    #[test]
    fn test_expected_len_below_two_points() {
        assert_eq!(IndexStream::expected_len(0), 0);
        assert_eq!(IndexStream::expected_len(1), 0);
        assert_eq!(IndexStream::expected_len(2), 5);
    }

    #[test]
    fn test_minimal_grid() {
        let s = stream(2);
        assert_eq!(s.as_slice(), &[2, 0, 3, 1, RESTART_INDEX]);
    }

    #[test]
    fn test_four_point_grid_layout() {
        let s = stream(4);
        assert_eq!(s.len(), 27);
        assert_eq!(&s.as_slice()[..2], &[4, 0]);
        assert_eq!(
            &s.as_slice()[..9],
            &[4, 0, 5, 1, 6, 2, 7, 3, RESTART_INDEX]
        );
        assert_eq!(
            &s.as_slice()[18..],
            &[12, 8, 13, 9, 14, 10, 15, 11, RESTART_INDEX]
        );
    }

    #[test]
    fn test_restart_follows_every_band() {
        let n = 5;
        let s = stream(n);
        let band_len = 2 * n as usize + 1;
        for (band, chunk) in s.as_slice().chunks(band_len).enumerate() {
            assert_eq!(chunk.len(), band_len, "band {band} is short");
            assert_eq!(*chunk.last().unwrap(), RESTART_INDEX);
            assert!(chunk[..band_len - 1].iter().all(|&i| i != RESTART_INDEX));
        }
    }

    #[test]
    fn test_indices_stay_in_lattice() {
        let n = 7;
        let s = stream(n);
        assert!(
            s.as_slice()
                .iter()
                .filter(|&&i| i != RESTART_INDEX)
                .all(|&i| i < n * n)
        );
    }
}
