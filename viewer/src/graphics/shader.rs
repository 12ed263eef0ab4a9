//! WGSL loading and validation
//!
//! The terrain shader is read from disk so it can be edited and reloaded
//! while the viewer runs. Sources are validated with naga before wgpu sees
//! them, so a broken edit is reported instead of failing pipeline creation.

use std::path::{Path, PathBuf};

/// Copy of `shaders/terrain.wgsl` baked into the binary
pub const BUILTIN_TERRAIN_SHADER: &str = include_str!("../../shaders/terrain.wgsl");

pub const VERTEX_ENTRY_POINT: &str = "vs";
pub const FRAGMENT_ENTRY_POINT: &str = "fs";

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WGSL parse error:\n{0}")]
    Parse(String),

    #[error("WGSL validation error: {0}")]
    Validation(String),

    #[error("missing {stage} entry point '{name}'")]
    MissingEntryPoint {
        stage: &'static str,
        name: &'static str,
    },

    /// Rejected by wgpu while building the render pipelines
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// Parse and validate a WGSL source.
///
/// Only baseline capabilities are accepted, and the module must export the
/// `vs` vertex and `fs` fragment stages the pipelines are built from.
pub fn validate_wgsl(source: &str) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::Parse(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Validation(format!("{:?}", e.into_inner())))?;

    require_entry_point(&module, naga::ShaderStage::Vertex, "vertex", VERTEX_ENTRY_POINT)?;
    require_entry_point(
        &module,
        naga::ShaderStage::Fragment,
        "fragment",
        FRAGMENT_ENTRY_POINT,
    )?;

    Ok(())
}

fn require_entry_point(
    module: &naga::Module,
    stage: naga::ShaderStage,
    stage_name: &'static str,
    name: &'static str,
) -> Result<(), ShaderError> {
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == name);
    if found {
        Ok(())
    } else {
        Err(ShaderError::MissingEntryPoint {
            stage: stage_name,
            name,
        })
    }
}

/// Read a WGSL file and validate it.
pub fn load_wgsl(path: &Path) -> Result<String, ShaderError> {
    let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    validate_wgsl(&source)?;
    Ok(source)
}

/// Shader source for the first pipeline.
///
/// Falls back to the built-in copy only when the file cannot be read; a file
/// that exists but fails validation is still an error.
pub fn initial_source(path: &Path) -> Result<String, ShaderError> {
    match load_wgsl(path) {
        Ok(source) => Ok(source),
        Err(ShaderError::Io { path, source }) => {
            tracing::warn!(
                "Cannot read {} ({}), using built-in terrain shader",
                path.display(),
                source
            );
            Ok(BUILTIN_TERRAIN_SHADER.to_string())
        }
        Err(e) => Err(e),
    }
}
