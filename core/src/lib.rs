//! Terrain Core - CPU side of the terrain viewer
//!
//! This crate builds the terrain mesh once at startup and holds the state
//! that input mutates every frame. It has no GPU dependency; the viewer
//! uploads what it produces.
//!
//! # Architecture
//!
//! - [`TerrainMesh`] - Lattice, triangle-strip indices and per-face tangent frames
//! - [`CameraRig`] - First-person fly camera driven by mouse-look and held keys
//! - [`SceneParameterStore`] - Height scale, light direction and display toggles
//! - [`FrameUniforms`] - Uniform block assembled from the above each frame
//! - [`Bitmap`] - 24-bit BMP decoder for the terrain textures

pub mod bitmap;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod mesh;
pub mod scene;
pub mod uniforms;

pub use bitmap::Bitmap;
pub use camera::{CameraRig, CameraSettings, CameraState, CursorSource, InputSnapshot, MovementKeys};
pub use clock::FrameClock;
pub use config::Config;
pub use error::{BitmapError, ConfigError, MeshError};
pub use input::{Action, KeyBindings, KeyMap};
pub use mesh::{
    FrontFace, IndexStream, Lattice, RESTART_INDEX, StripWinding, TERRAIN_WINDING, TangentFrame,
    TerrainMesh,
};
pub use scene::{SceneAction, SceneParameterStore, SceneSettings};
pub use uniforms::FrameUniforms;
