//! # fixpoint-core
//!
//! The staged bootstrap engine for a self-hosting compiler - THE LOGIC.
//!
//! The compiler is brought up in three binaries and one check:
//!
//! 1. **bootstrap** - cmake/make build stage-0 from the reference implementation.
//! 2. **lift** - stage-0 emits IR for the self-hosted sources; a secondary
//!    compiler (clang) links it into stage-1.
//! 3. **self-host** - stage-1 builds stage-2 with no secondary compiler.
//! 4. **verify** - stage-2 rebuilds itself in place: the self-hosting fixpoint.
//!
//! The compilers themselves are opaque executables; this crate only decides
//! what to run, in which order, and what a failure means.
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network dependencies (pure Rust)
//! - Strictly sequential: a stage starts only after its predecessor succeeded
//! - Never exits the process: failures are [`FixpointError`] values and the
//!   binary decides the exit status
//! - Never changes the process working directory

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod executor;
pub mod pipeline;
pub mod primitives;
pub mod stages;
pub mod system;
pub mod toolchain;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BuildArtifact, CommandLine, FixpointError};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use config::{BuildConfig, BuildLayout, CompileConfig, PipelineConfig, ToolchainConfig};
pub use executor::{CommandRunner, DryRunRunner, ProcessRunner, execute};
pub use pipeline::Pipeline;
pub use stages::{StagePlan, run_stage};
pub use toolchain::{
    Probe, ProbeOrder, ResolvedToolchain, SearchOrder, ToolCandidates, ToolchainResolver,
};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{PipelineState, Stage};
