//! # Fixed Defaults
//!
//! Baked-in defaults for the bootstrap layout and tool flags. Every value here
//! can be overridden through [`crate::config::PipelineConfig`]; these are only
//! what an empty config file resolves to.

/// Build root, relative to the project root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Reference-implementation source tree handed to cmake.
pub const DEFAULT_BOOTSTRAP_SOURCE: &str = "bootstrap";

/// Self-hosted compiler sources, passed as the library root.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Entry file of the self-hosted compiler.
pub const DEFAULT_ENTRY: &str = "src/main.colgm";

/// cmake build profile for stage-0.
pub const DEFAULT_BUILD_TYPE: &str = "RelWithDebInfo";

/// Parallelism handed to make. Parallelism stays inside make; stages never overlap.
pub const DEFAULT_JOBS: u32 = 6;

/// Optimization level suffix, rendered as `-O<level>`.
pub const DEFAULT_OPT_LEVEL: &str = "z";

/// Lowest supported secondary compiler major version.
pub const MIN_CLANG_VERSION: u32 = 13;

/// Highest supported secondary compiler major version.
pub const MAX_CLANG_VERSION: u32 = 19;

/// Secondary compiler name in C mode.
pub const CLANG_C: &str = "clang";

/// Secondary compiler name in C++ mode.
pub const CLANG_CXX: &str = "clang++";

// =============================================================================
// SELF-HOSTED COMPILER FLAGS
// =============================================================================

/// Library search root flag of the self-hosted compiler.
pub const FLAG_LIBRARY: &str = "--library";

/// Output path flag, shared by the self-hosted compiler and clang.
pub const FLAG_OUTPUT: &str = "-o";

/// Pass tracing flag understood by stage-0.
pub const FLAG_PASS_INFO: &str = "--pass-info";

/// Verbose flag understood by stage-1 and stage-2.
pub const FLAG_VERBOSE: &str = "--verbose";

/// Debug info flag.
pub const FLAG_DEBUG_INFO: &str = "-g";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_range_is_ascending() {
        assert!(MIN_CLANG_VERSION <= MAX_CLANG_VERSION);
    }
}
