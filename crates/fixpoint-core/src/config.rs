//! # Pipeline Configuration
//!
//! Every path and flag the pipeline uses lives in [`PipelineConfig`]. The
//! binary deserializes it from `fixpoint.toml`; tests build it directly and
//! point the tools at stand-ins.
//!
//! ```toml
//! project_root = "."
//! build_dir = "build"
//!
//! [build]
//! jobs = 6
//!
//! [compile]
//! opt_level = "z"
//!
//! [toolchain]
//! search_order = "directory-major"
//! ```

use crate::primitives::{
    DEFAULT_BOOTSTRAP_SOURCE, DEFAULT_BUILD_DIR, DEFAULT_BUILD_TYPE, DEFAULT_ENTRY, DEFAULT_JOBS,
    DEFAULT_OPT_LEVEL, DEFAULT_SOURCE_ROOT, MAX_CLANG_VERSION, MIN_CLANG_VERSION,
};
use crate::toolchain::SearchOrder;
use crate::{BuildArtifact, FixpointError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory every other relative path is resolved against.
    pub project_root: PathBuf,
    /// Build root holding all artifacts.
    pub build_dir: PathBuf,
    /// Reference-implementation sources for stage-0.
    pub bootstrap_source: PathBuf,
    /// Self-hosted compiler sources (library root).
    pub source_root: PathBuf,
    /// Entry file of the self-hosted compiler.
    pub entry: PathBuf,
    pub build: BuildConfig,
    pub compile: CompileConfig,
    pub toolchain: ToolchainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            bootstrap_source: PathBuf::from(DEFAULT_BOOTSTRAP_SOURCE),
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            entry: PathBuf::from(DEFAULT_ENTRY),
            build: BuildConfig::default(),
            compile: CompileConfig::default(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

/// Stage-0 build system settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Value of `-DCMAKE_BUILD_TYPE`.
    pub build_type: String,
    /// Value of make's `-j`.
    pub jobs: u32,
    /// Build-configuration tool.
    pub cmake: PathBuf,
    /// Build-execution tool.
    pub make: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            jobs: DEFAULT_JOBS,
            cmake: PathBuf::from("cmake"),
            make: PathBuf::from("make"),
        }
    }
}

/// Flags shared by the self-hosted compiler invocations and the IR link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Optimization level, rendered as `-O<opt_level>`.
    pub opt_level: String,
    pub debug_info: bool,
    /// Export all symbols to the dynamic table when linking stage-1.
    pub rdynamic: bool,
    /// Libraries linked into stage-1, rendered as `-l<name>`.
    pub link_libs: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            opt_level: DEFAULT_OPT_LEVEL.to_string(),
            debug_info: true,
            rdynamic: true,
            link_libs: vec!["m".to_string()],
        }
    }
}

impl CompileConfig {
    #[must_use]
    pub fn opt_flag(&self) -> String {
        format!("-O{}", self.opt_level)
    }
}

/// Secondary compiler discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub min_version: u32,
    pub max_version: u32,
    pub search_order: SearchOrder,
    /// Use this compiler and skip the search entirely.
    pub compiler: Option<PathBuf>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            min_version: MIN_CLANG_VERSION,
            max_version: MAX_CLANG_VERSION,
            search_order: SearchOrder::default(),
            compiler: None,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations no stage could run with.
    pub fn validate(&self) -> Result<(), FixpointError> {
        if self.build.jobs == 0 {
            return Err(FixpointError::Config(
                "build.jobs must be at least 1".to_string(),
            ));
        }
        if self.toolchain.min_version > self.toolchain.max_version {
            return Err(FixpointError::Config(format!(
                "toolchain.min_version ({}) is greater than toolchain.max_version ({})",
                self.toolchain.min_version, self.toolchain.max_version
            )));
        }
        if self.entry.as_os_str().is_empty() {
            return Err(FixpointError::Config("entry must not be empty".to_string()));
        }
        if self.build_dir.as_os_str().is_empty() {
            return Err(FixpointError::Config(
                "build_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// BUILD LAYOUT
// =============================================================================

/// Absolute paths derived from a [`PipelineConfig`].
///
/// Paths are made absolute once, up front, because the bootstrap stage runs
/// its tools from inside the build root while later stages run from wherever
/// the binary was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    root: PathBuf,
    build_dir: PathBuf,
    bootstrap_source: PathBuf,
    source_root: PathBuf,
    entry: PathBuf,
}

impl BuildLayout {
    pub fn new(config: &PipelineConfig) -> Result<Self, FixpointError> {
        let root = std::path::absolute(&config.project_root)
            .map_err(|e| FixpointError::io(&config.project_root, e))?;

        Ok(Self {
            build_dir: root.join(&config.build_dir),
            bootstrap_source: root.join(&config.bootstrap_source),
            source_root: root.join(&config.source_root),
            entry: root.join(&config.entry),
            root,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    #[must_use]
    pub fn bootstrap_source(&self) -> &Path {
        &self.bootstrap_source
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    #[must_use]
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Where `artifact` lives under the build root.
    #[must_use]
    pub fn artifact(&self, artifact: BuildArtifact) -> PathBuf {
        self.build_dir.join(artifact.file_name())
    }

    /// Create the build root if it does not exist yet. Idempotent.
    pub fn ensure_build_dir(&self) -> Result<(), FixpointError> {
        std::fs::create_dir_all(&self.build_dir)
            .map_err(|e| FixpointError::io(&self.build_dir, e))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bootstrap_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.build.jobs, 6);
        assert_eq!(config.build.build_type, "RelWithDebInfo");
        assert_eq!(config.compile.opt_flag(), "-Oz");
        assert_eq!(config.toolchain.min_version, 13);
        assert_eq!(config.toolchain.max_version, 19);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_jobs_rejected() {
        let mut config = PipelineConfig::default();
        config.build.jobs = 0;
        assert!(matches!(config.validate(), Err(FixpointError::Config(_))));
    }

    #[test]
    fn inverted_version_range_rejected() {
        let mut config = PipelineConfig::default();
        config.toolchain.min_version = 20;
        assert!(matches!(config.validate(), Err(FixpointError::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn layout_is_absolute_and_under_root() {
        let config = PipelineConfig {
            project_root: PathBuf::from("/work/colgm"),
            ..PipelineConfig::default()
        };
        let layout = BuildLayout::new(&config).expect("layout");

        assert!(layout.build_dir().is_absolute());
        assert_eq!(
            layout.artifact(BuildArtifact::LiftedCompiler),
            PathBuf::from("/work/colgm/build/colgm_lifted")
        );
        assert_eq!(layout.entry(), Path::new("/work/colgm/src/main.colgm"));
    }

    #[test]
    fn ensure_build_dir_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig {
            project_root: dir.path().to_path_buf(),
            build_dir: PathBuf::from("out/nested"),
            ..PipelineConfig::default()
        };
        let layout = BuildLayout::new(&config).expect("layout");

        layout.ensure_build_dir().expect("first");
        layout.ensure_build_dir().expect("second");
        assert!(dir.path().join("out/nested").is_dir());
    }
}
