//! Strip winding convention
//!
//! The strip indexer, the tangent builder and the rasterizer's face culling
//! all depend on the same vertex order. They read it from [`TERRAIN_WINDING`]
//! so a change here shows up everywhere at once.

/// Which rotation the rasterizer treats as front-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise triangles face the viewer
    Ccw,
    /// Clockwise triangles face the viewer
    Cw,
}

/// Vertex order used when walking the lattice into a strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripWinding {
    /// Emit the next-row vertex before the current-row vertex for each column
    pub bottom_first: bool,
    /// Front face seen from +Y with this ordering
    pub front_face: FrontFace,
}

/// Convention for the terrain strip: `(bottomLeft, topLeft)` per column,
/// counter-clockwise front faces when viewed from above.
pub const TERRAIN_WINDING: StripWinding = StripWinding {
    bottom_first: true,
    front_face: FrontFace::Ccw,
};

impl StripWinding {
    /// Order the two indices emitted for one column of a band.
    pub const fn column_pair(&self, top: u32, bottom: u32) -> [u32; 2] {
        if self.bottom_first {
            [bottom, top]
        } else {
            [top, bottom]
        }
    }

    /// Corner order used to read a triangle out of the strip.
    ///
    /// Consecutive triangles of a strip alternate rotation. The returned
    /// permutation undoes that so every face is read with the same rotation.
    pub const fn triangle_corners(&self, triangle_index: usize) -> [usize; 3] {
        let even = triangle_index % 2 == 0;
        if even == self.bottom_first {
            [0, 2, 1]
        } else {
            [0, 1, 2]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_column_pair_is_bottom_then_top() {
        assert_eq!(TERRAIN_WINDING.column_pair(0, 4), [4, 0]);
    }

    #[test]
    fn test_terrain_corners_alternate_by_parity() {
        assert_eq!(TERRAIN_WINDING.triangle_corners(0), [0, 2, 1]);
        assert_eq!(TERRAIN_WINDING.triangle_corners(1), [0, 1, 2]);
        assert_eq!(TERRAIN_WINDING.triangle_corners(2), [0, 2, 1]);
    }

    #[test]
    fn test_flipping_pair_order_flips_corner_order() {
        let top_first = StripWinding {
            bottom_first: false,
            front_face: FrontFace::Cw,
        };
        assert_eq!(top_first.column_pair(0, 4), [0, 4]);
        assert_eq!(top_first.triangle_corners(0), [0, 1, 2]);
        assert_eq!(top_first.triangle_corners(1), [0, 2, 1]);
    }
}
