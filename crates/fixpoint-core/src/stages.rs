//! # Bootstrap Stages
//!
//! The command lines behind each [`Stage`] transition and the code that runs
//! them. Stage inputs are never checked on disk; the pipeline only ever calls
//! a stage after its predecessor succeeded.
//!
//! ## Stages
//!
//! - **bootstrap**: `cmake <bootstrap> -DCMAKE_BUILD_TYPE=..` then `make -jN`,
//!   both run inside the build root.
//! - **lift**: stage-0 emits IR for the self-hosted sources, then the
//!   secondary compiler links it into stage-1.
//! - **self-host**: stage-1 builds stage-2 directly.
//! - **verify**: stage-2 rebuilds itself onto its own path.

use crate::config::{BuildLayout, PipelineConfig};
use crate::executor::{CommandRunner, execute};
use crate::primitives::{FLAG_DEBUG_INFO, FLAG_LIBRARY, FLAG_OUTPUT, FLAG_PASS_INFO, FLAG_VERBOSE};
use crate::system::Stage;
use crate::toolchain::ResolvedToolchain;
use crate::{BuildArtifact, CommandLine, FixpointError};
use std::path::Path;

// =============================================================================
// STAGE PLAN
// =============================================================================

/// Builds the command lines for every stage from one config and layout.
#[derive(Debug, Clone, Copy)]
pub struct StagePlan<'a> {
    config: &'a PipelineConfig,
    layout: &'a BuildLayout,
}

impl<'a> StagePlan<'a> {
    #[must_use]
    pub fn new(config: &'a PipelineConfig, layout: &'a BuildLayout) -> Self {
        Self { config, layout }
    }

    /// Configure and build the reference implementation inside the build root.
    #[must_use]
    pub fn bootstrap(&self) -> Vec<CommandLine> {
        let build = &self.config.build;
        let build_dir = self.layout.build_dir();

        vec![
            CommandLine::new(&build.cmake)
                .arg(self.layout.bootstrap_source())
                .arg(format!("-DCMAKE_BUILD_TYPE={}", build.build_type))
                .current_dir(build_dir),
            CommandLine::new(&build.make)
                .arg(format!("-j{}", build.jobs))
                .current_dir(build_dir),
        ]
    }

    /// Emit IR with stage-0, then link it into stage-1 with `toolchain`.
    #[must_use]
    pub fn lift(&self, toolchain: &ResolvedToolchain) -> Vec<CommandLine> {
        let compile = &self.config.compile;
        let ir = self.layout.artifact(BuildArtifact::LiftedIr);

        let emit = CommandLine::new(self.layout.artifact(BuildArtifact::BootstrapCompiler))
            .arg(FLAG_LIBRARY)
            .arg(self.layout.source_root())
            .arg(self.layout.entry())
            .arg(FLAG_OUTPUT)
            .arg(&ir)
            .arg(FLAG_PASS_INFO);

        let mut link = CommandLine::new(toolchain.path())
            .arg(&ir)
            .arg(FLAG_OUTPUT)
            .arg(self.layout.artifact(BuildArtifact::LiftedCompiler));
        if compile.debug_info {
            link = link.arg(FLAG_DEBUG_INFO);
        }
        link = link.arg(compile.opt_flag());
        if compile.rdynamic {
            link = link.arg("-rdynamic");
        }
        link = link.args(compile.link_libs.iter().map(|lib| format!("-l{}", lib)));

        vec![emit, link]
    }

    /// Build stage-2 with stage-1.
    #[must_use]
    pub fn self_host(&self) -> Vec<CommandLine> {
        vec![self.self_compile(
            &self.layout.artifact(BuildArtifact::LiftedCompiler),
            &self.layout.artifact(BuildArtifact::SelfHostCompiler),
        )]
    }

    /// Rebuild stage-2 with itself, onto its own path.
    #[must_use]
    pub fn verify(&self) -> Vec<CommandLine> {
        let self_host = self.layout.artifact(BuildArtifact::SelfHostCompiler);
        vec![self.self_compile(&self_host, &self_host)]
    }

    /// Commands that move the pipeline into `stage`.
    ///
    /// `toolchain` is only consulted for [`Stage::Lifted`].
    pub fn commands(
        &self,
        stage: Stage,
        toolchain: Option<&ResolvedToolchain>,
    ) -> Result<Vec<CommandLine>, FixpointError> {
        Ok(match stage {
            Stage::Init => Vec::new(),
            Stage::BootstrapBuilt => self.bootstrap(),
            Stage::Lifted => match toolchain {
                Some(toolchain) => self.lift(toolchain),
                None => return Err(FixpointError::ToolchainRequired { stage }),
            },
            Stage::SelfHostBuilt => self.self_host(),
            Stage::Verified => self.verify(),
        })
    }

    fn self_compile(&self, compiler: &Path, output: &Path) -> CommandLine {
        let compile = &self.config.compile;

        let mut cmd = CommandLine::new(compiler)
            .arg(FLAG_LIBRARY)
            .arg(self.layout.source_root())
            .arg(self.layout.entry())
            .arg(FLAG_VERBOSE);
        if compile.debug_info {
            cmd = cmd.arg(FLAG_DEBUG_INFO);
        }
        cmd.arg(compile.opt_flag()).arg(FLAG_OUTPUT).arg(output)
    }
}

// =============================================================================
// STAGE EXECUTION
// =============================================================================

/// Run the commands that move the pipeline into `stage`.
///
/// The build root is created first, every time. A failed stage-1 link leaves
/// no stage-1 binary behind, partial or stale.
pub fn run_stage(
    runner: &dyn CommandRunner,
    plan: &StagePlan<'_>,
    stage: Stage,
    toolchain: Option<&ResolvedToolchain>,
) -> Result<(), FixpointError> {
    let commands = plan.commands(stage, toolchain)?;
    plan.layout.ensure_build_dir()?;

    for command in &commands {
        if let Err(err) = execute(runner, command) {
            if stage == Stage::Lifted {
                remove_artifact(&plan.layout.artifact(BuildArtifact::LiftedCompiler));
            }
            return Err(err);
        }
    }

    Ok(())
}

fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::warn!("Removed incomplete artifact {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
