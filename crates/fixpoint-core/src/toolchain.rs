//! # Toolchain Resolution
//!
//! Locates the secondary compiler that turns lifted IR into the stage-1
//! binary. Candidates are version-suffixed clang names in ascending version
//! order (`clang-13`, `clang++-13`, ..., `clang-19`, `clang++-19`) followed by
//! the unsuffixed `clang` and `clang++`.
//!
//! ## Search Order
//!
//! Every (search path entry, candidate) pair is a [`Probe`]. Probes are sorted
//! by a [`ProbeOrder`] and the first one that exists on disk wins.
//!
//! The default, [`SearchOrder::DirectoryMajor`], walks directories left to
//! right and tries every candidate in each directory before moving on. A plain
//! `clang` in an early `PATH` entry therefore beats `clang-19` in a later one.
//! [`SearchOrder::NameMajor`] flips that: candidate priority first, directory
//! order only as a tie-breaker.

use crate::config::ToolchainConfig;
use crate::primitives::{CLANG_C, CLANG_CXX};
use crate::FixpointError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

// =============================================================================
// CANDIDATES
// =============================================================================

/// Ordered executable names considered interchangeable secondary compilers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCandidates {
    names: Vec<String>,
}

impl ToolCandidates {
    /// clang candidates for every major version in `min..=max`, then the
    /// unsuffixed fallbacks.
    #[must_use]
    pub fn clang(min_version: u32, max_version: u32) -> Self {
        let mut names = Vec::new();
        for version in min_version..=max_version {
            names.push(format!("{}-{}", CLANG_C, version));
            names.push(format!("{}-{}", CLANG_CXX, version));
        }
        names.push(CLANG_C.to_string());
        names.push(CLANG_CXX.to_string());
        Self { names }
    }

    /// Candidates from explicit names, highest priority first.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// =============================================================================
// PROBE ORDERING
// =============================================================================

/// One place the compiler might live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Position of the directory in the search path.
    pub dir_index: usize,
    /// Position of the name in [`ToolCandidates`].
    pub name_index: usize,
    pub path: PathBuf,
}

/// Decides which probe is tried first.
pub trait ProbeOrder {
    fn compare(&self, a: &Probe, b: &Probe) -> Ordering;
}

/// Built-in probe orderings, selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOrder {
    /// Directory precedence over name precedence.
    #[default]
    DirectoryMajor,
    /// Name precedence over directory precedence.
    NameMajor,
}

impl ProbeOrder for SearchOrder {
    fn compare(&self, a: &Probe, b: &Probe) -> Ordering {
        match self {
            SearchOrder::DirectoryMajor => {
                (a.dir_index, a.name_index).cmp(&(b.dir_index, b.name_index))
            }
            SearchOrder::NameMajor => {
                (a.name_index, a.dir_index).cmp(&(b.name_index, b.dir_index))
            }
        }
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// A secondary compiler that was found (or given explicitly).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToolchain {
    path: PathBuf,
}

impl ResolvedToolchain {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Searches a path list for the first usable secondary compiler.
pub struct ToolchainResolver {
    candidates: ToolCandidates,
    order: Box<dyn ProbeOrder>,
    search_path: Option<OsString>,
    explicit: Option<PathBuf>,
}

impl ToolchainResolver {
    /// Resolver over `candidates` using the directory-major order and `PATH`.
    #[must_use]
    pub fn new(candidates: ToolCandidates) -> Self {
        Self {
            candidates,
            order: Box::new(SearchOrder::default()),
            search_path: None,
            explicit: None,
        }
    }

    /// Resolver set up from the `[toolchain]` config section.
    #[must_use]
    pub fn from_config(config: &ToolchainConfig) -> Self {
        let mut resolver = Self::new(ToolCandidates::clang(
            config.min_version,
            config.max_version,
        ))
        .with_order(config.search_order);
        resolver.explicit = config.compiler.clone();
        resolver
    }

    /// Replace the probe ordering policy.
    #[must_use]
    pub fn with_order(mut self, order: impl ProbeOrder + 'static) -> Self {
        self.order = Box::new(order);
        self
    }

    /// Search this path list instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    #[must_use]
    pub fn candidates(&self) -> &ToolCandidates {
        &self.candidates
    }

    fn directories(&self) -> Vec<PathBuf> {
        let raw = match &self.search_path {
            Some(path) => Some(path.clone()),
            None => std::env::var_os("PATH"),
        };

        // Empty entries are skipped rather than read as the current directory.
        raw.map(|path| {
            std::env::split_paths(&path)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Every probe, in the order they will be tried.
    #[must_use]
    pub fn probes(&self) -> Vec<Probe> {
        let mut probes = Vec::new();
        for (dir_index, dir) in self.directories().iter().enumerate() {
            for (name_index, name) in self.candidates.names().iter().enumerate() {
                probes.push(Probe {
                    dir_index,
                    name_index,
                    path: dir.join(name),
                });
            }
        }
        probes.sort_by(|a, b| self.order.compare(a, b));
        probes
    }

    /// Find the secondary compiler.
    ///
    /// An explicit compiler from config is returned as-is without touching
    /// the filesystem.
    pub fn resolve(&self) -> Result<ResolvedToolchain, FixpointError> {
        if let Some(explicit) = &self.explicit {
            tracing::debug!("Using configured compiler {}", explicit.display());
            return Ok(ResolvedToolchain::new(explicit));
        }

        let probes = self.probes();
        for probe in &probes {
            if probe.path.exists() {
                tracing::debug!("Found secondary compiler {}", probe.path.display());
                return Ok(ResolvedToolchain::new(&probe.path));
            }
            tracing::trace!("No compiler at {}", probe.path.display());
        }

        Err(FixpointError::ToolchainNotFound {
            searched: self.directories().len(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_ascending_then_fallbacks() {
        let candidates = ToolCandidates::clang(13, 14);
        assert_eq!(
            candidates.names(),
            ["clang-13", "clang++-13", "clang-14", "clang++-14", "clang", "clang++"]
        );
    }

    #[test]
    fn default_range_has_sixteen_names() {
        let candidates = ToolCandidates::clang(13, 19);
        assert_eq!(candidates.names().len(), 16);
        assert_eq!(candidates.names()[0], "clang-13");
        assert_eq!(candidates.names()[13], "clang++-19");
        assert_eq!(candidates.names()[15], "clang++");
    }

    #[test]
    fn directory_major_orders_by_directory_first() {
        let a = Probe {
            dir_index: 0,
            name_index: 5,
            path: PathBuf::new(),
        };
        let b = Probe {
            dir_index: 1,
            name_index: 0,
            path: PathBuf::new(),
        };
        assert_eq!(SearchOrder::DirectoryMajor.compare(&a, &b), Ordering::Less);
        assert_eq!(SearchOrder::NameMajor.compare(&a, &b), Ordering::Greater);
    }

    #[cfg(unix)]
    #[test]
    fn probes_skip_empty_path_entries() {
        let resolver = ToolchainResolver::new(ToolCandidates::from_names(["clang"]))
            .with_search_path("/a::/b:");
        let paths: Vec<_> = resolver.probes().into_iter().map(|p| p.path).collect();
        assert_eq!(paths, vec![PathBuf::from("/a/clang"), PathBuf::from("/b/clang")]);
    }

    #[test]
    fn empty_search_path_is_not_found() {
        let resolver = ToolchainResolver::new(ToolCandidates::clang(13, 19)).with_search_path("");
        assert!(matches!(
            resolver.resolve(),
            Err(FixpointError::ToolchainNotFound { searched: 0 })
        ));
    }

    #[test]
    fn explicit_compiler_skips_search() {
        let config = ToolchainConfig {
            compiler: Some(PathBuf::from("/opt/llvm/bin/clang")),
            ..ToolchainConfig::default()
        };
        let resolver = ToolchainResolver::from_config(&config).with_search_path("");
        let resolved = resolver.resolve().expect("explicit");
        assert_eq!(resolved.path(), Path::new("/opt/llvm/bin/clang"));
    }
}
