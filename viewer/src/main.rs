//! Terrain Viewer
//!
//! Renders a height-mapped terrain with slope and altitude material blending
//! and a free-flying camera.
//!
//! # Usage
//!
//! ```bash
//! terrain-viewer
//! terrain-viewer --config terrain.toml --points 256
//! ```
//!
//! # Keyboard Shortcuts
//!
//! - Arrow keys: Move
//! - Mouse: Look
//! - T / G: Raise / lower terrain height
//! - D / A: Rotate light about the up axis
//! - W / S: Rotate light about the right axis
//! - Space: Toggle wireframe
//! - N: Toggle normal visualization
//! - R: Reload shader
//! - ESC: Quit

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use terrain_core::TerrainMesh;

mod app;
mod cursor;
mod graphics;

#[derive(Parser)]
#[command(name = "terrain-viewer")]
#[command(author, version, about = "Height-mapped terrain viewer")]
struct Args {
    /// Config file (default: terrain.toml in the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the BMP textures
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Lattice points along each edge
    #[arg(long)]
    points: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config = terrain_core::config::load(args.config.as_deref());
    if let Some(assets) = args.assets {
        config.assets.directory = assets;
    }
    if let Some(points) = args.points {
        config.mesh.point_count = points;
    }

    let mesh = TerrainMesh::generate(config.mesh.point_count, config.mesh.world_scale)
        .context("Failed to build terrain mesh")?;

    let key_map = config.keys.resolve().context("Invalid key bindings")?;

    if let Err(e) = app::run(config, mesh, key_map) {
        tracing::error!("Application error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
