//! Configuration (`terrain.toml`)
//!
//! Every section is optional. Values missing from the file take the
//! defaults below, which reproduce the stock terrain scene.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::camera::CameraSettings;
use crate::error::ConfigError;
use crate::input::KeyBindings;
use crate::scene::SceneSettings;

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "terrain.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub mesh: MeshConfig,
    pub camera: CameraSettings,
    pub scene: SceneSettings,
    pub assets: AssetConfig,
    pub keys: KeyBindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1268,
            height: 720,
            title: "Terrain Viewer".to_string(),
            vsync: true,
        }
    }
}

/// Terrain lattice dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Points along each edge
    pub point_count: u32,
    /// Half-width of the terrain in world units
    pub world_scale: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            point_count: 200,
            world_scale: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the BMP textures
    pub directory: PathBuf,
    /// WGSL source, reloaded on demand
    pub shader: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            shader: PathBuf::from("viewer/shaders/terrain.wgsl"),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/terrain-viewer`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "terrain-viewer", "terrain-viewer")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`Config`].
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration.
///
/// Uses `explicit` when given, otherwise `terrain.toml` in the platform
/// config directory. Falls back to defaults when the file is missing or
/// malformed.
pub fn load(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists()),
    };

    let Some(path) = path else {
        info!("No config file found, using defaults");
        return Config::default();
    };

    match load_from(&path) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded config");
            config
        }
        Err(e) => {
            warn!("{e}, using defaults");
            Config::default()
        }
    }
}

/// Saves the configuration as pretty-printed TOML.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}
