//! Error types for the terrain core
//!
//! Mesh preconditions, bitmap decoding and configuration each get their own
//! enum so callers can decide which failures are fatal.

use std::path::PathBuf;

/// Precondition failures when synthesizing the terrain mesh
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// The lattice needs at least a 2×2 grid of points
    #[error("point count {point_count} is too small (minimum 2)")]
    PointCountTooSmall { point_count: u32 },

    /// World scale must be strictly positive
    #[error("world scale {world_scale} must be greater than zero")]
    NonPositiveScale { world_scale: f32 },

    /// A lattice this large would collide with the restart sentinel
    #[error("point count {point_count} produces vertex indices that collide with the restart index")]
    IndexOverflow { point_count: u32 },
}

/// Failures while decoding a 24-bit uncompressed BMP file
#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file is shorter than the 54-byte BMP header ({len} bytes)")]
    TooShort { len: usize },

    #[error("missing 'BM' signature")]
    BadSignature,

    #[error("compressed bitmaps are not supported (compression = {compression})")]
    Compressed { compression: u32 },

    #[error("only 24 bits per pixel is supported (found {bits})")]
    UnsupportedBitDepth { bits: u16 },

    #[error("invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("pixel data truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Failures while loading `terrain.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown key '{name}' bound to {binding}")]
    UnknownKey { binding: &'static str, name: String },
}
