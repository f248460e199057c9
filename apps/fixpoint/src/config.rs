//! # Config File Loading
//!
//! Reads `fixpoint.toml` into a [`PipelineConfig`] and applies CLI overrides.
//!
//! A relative `project_root` inside a config file is taken relative to the
//! file's own directory, so `fixpoint --config ../colgm/fixpoint.toml run`
//! works from anywhere.

use fixpoint_core::{FixpointError, PipelineConfig};
use std::path::{Path, PathBuf};

/// Config file looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fixpoint.toml";

/// Values from the command line that win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub jobs: Option<u32>,
    pub compiler: Option<PathBuf>,
}

/// Load the pipeline config.
///
/// An explicit path must exist. Without one, `fixpoint.toml` in the current
/// directory is used if present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, FixpointError> {
    match path {
        Some(path) => read_config_file(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                read_config_file(default)
            } else {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(PipelineConfig::default())
            }
        }
    }
}

fn read_config_file(path: &Path) -> Result<PipelineConfig, FixpointError> {
    let text = std::fs::read_to_string(path).map_err(|e| FixpointError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut config = parse_config(&text)
        .map_err(|e| FixpointError::Config(format!("{}: {}", path.display(), e)))?;

    if config.project_root.is_relative() {
        if let Some(parent) = path.parent() {
            config.project_root = parent.join(&config.project_root);
        }
    }

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse TOML text into a config. Missing keys fall back to defaults.
pub fn parse_config(text: &str) -> Result<PipelineConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Apply command-line overrides on top of a loaded config.
pub fn apply_overrides(mut config: PipelineConfig, overrides: &Overrides) -> PipelineConfig {
    if let Some(root) = &overrides.root {
        config.project_root = root.clone();
    }
    if let Some(build_dir) = &overrides.build_dir {
        config.build_dir = build_dir.clone();
    }
    if let Some(jobs) = overrides.jobs {
        config.build.jobs = jobs;
    }
    if let Some(compiler) = &overrides.compiler {
        config.toolchain.compiler = Some(compiler.clone());
    }
    config
}

// =============================================================================
// TESTS
// =============================================================================
