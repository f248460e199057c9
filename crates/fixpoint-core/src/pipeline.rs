//! # Bootstrap Pipeline
//!
//! Drives the stages in their only legal order:
//!
//! ```text
//! Init -> BootstrapBuilt -> Lifted -> SelfHostBuilt -> Verified
//!   \__________\______________\__________\______________-> Aborted
//! ```
//!
//! Each successful stage is a hard gate for the next. The first failure
//! records [`PipelineState::Aborted`] and is returned to the caller; no later
//! stage runs on that pipeline afterwards. The secondary compiler is resolved
//! once, before the first stage, whenever the requested target needs it.

use crate::config::{BuildLayout, PipelineConfig};
use crate::executor::CommandRunner;
use crate::stages::{StagePlan, run_stage};
use crate::system::{PipelineState, Stage};
use crate::toolchain::{ResolvedToolchain, ToolchainResolver};
use crate::{CommandLine, FixpointError};

/// One bootstrap run over a single build root.
pub struct Pipeline<'r> {
    config: PipelineConfig,
    layout: BuildLayout,
    resolver: ToolchainResolver,
    runner: &'r dyn CommandRunner,
    toolchain: Option<ResolvedToolchain>,
    state: PipelineState,
}

impl<'r> Pipeline<'r> {
    /// Validate `config` and prepare a pipeline that runs commands via `runner`.
    pub fn new(
        config: PipelineConfig,
        runner: &'r dyn CommandRunner,
    ) -> Result<Self, FixpointError> {
        config.validate()?;
        let layout = BuildLayout::new(&config)?;
        let resolver = ToolchainResolver::from_config(&config.toolchain);

        Ok(Self {
            config,
            layout,
            resolver,
            runner,
            toolchain: None,
            state: PipelineState::default(),
        })
    }

    /// Replace the resolver built from config (custom search path or order).
    #[must_use]
    pub fn with_resolver(mut self, resolver: ToolchainResolver) -> Self {
        self.resolver = resolver;
        self.toolchain = None;
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[must_use]
    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The secondary compiler, resolved on first use and cached.
    pub fn toolchain(&mut self) -> Result<ResolvedToolchain, FixpointError> {
        if let Some(toolchain) = &self.toolchain {
            return Ok(toolchain.clone());
        }
        let resolved = self.resolver.resolve()?;
        self.toolchain = Some(resolved.clone());
        Ok(resolved)
    }

    /// Commands each remaining stage up to `target` would run, without running them.
    pub fn plan(&mut self, target: Stage) -> Result<Vec<(Stage, Vec<CommandLine>)>, FixpointError> {
        let toolchain = if target.needs_toolchain() {
            Some(self.toolchain()?)
        } else {
            None
        };

        let plan = StagePlan::new(&self.config, &self.layout);
        let mut stages = Vec::new();
        let mut current = self.state.reached();
        while current < target {
            let Some(next) = current.next() else { break };
            stages.push((next, plan.commands(next, toolchain.as_ref())?));
            current = next;
        }
        Ok(stages)
    }

    /// Run the next stage.
    ///
    /// Returns the stage now reached. Calling this on a verified pipeline is a
    /// no-op; calling it on an aborted one is an error.
    pub fn advance(&mut self) -> Result<Stage, FixpointError> {
        let current = match self.state {
            PipelineState::Aborted { reached, .. } => {
                return Err(FixpointError::PipelineAborted { reached });
            }
            PipelineState::At { stage } => stage,
        };
        let Some(next) = current.next() else {
            return Ok(current);
        };

        let toolchain = if next.needs_toolchain() {
            Some(self.toolchain().inspect_err(|e| self.abort(current, e))?)
        } else {
            None
        };

        tracing::info!("Stage {}: starting", next);
        let plan = StagePlan::new(&self.config, &self.layout);
        if let Err(e) = run_stage(self.runner, &plan, next, toolchain.as_ref()) {
            self.abort(current, &e);
            return Err(e);
        }

        self.state = PipelineState::At { stage: next };
        tracing::info!("Stage {}: done", next);
        Ok(next)
    }

    /// Run stages until `target` is reached.
    ///
    /// When `target` needs the secondary compiler it is resolved before the
    /// first stage runs, so a missing toolchain never leaves a half-built tree.
    pub fn run_until(&mut self, target: Stage) -> Result<Stage, FixpointError> {
        if let PipelineState::Aborted { reached, .. } = self.state {
            return Err(FixpointError::PipelineAborted { reached });
        }

        if target.needs_toolchain() && self.state.reached() < target {
            let current = self.state.reached();
            let toolchain = self.toolchain().inspect_err(|e| self.abort(current, e))?;
            tracing::info!("Using secondary compiler {}", toolchain.path().display());
        }

        while self.state.reached() < target {
            self.advance()?;
        }
        Ok(self.state.reached())
    }

    /// Run the whole bootstrap through the fixpoint check.
    pub fn run(&mut self) -> Result<Stage, FixpointError> {
        self.run_until(Stage::Verified)
    }

    fn abort(&mut self, reached: Stage, error: &FixpointError) {
        tracing::debug!("Pipeline aborted after {}: {}", reached, error);
        self.state = PipelineState::Aborted {
            reached,
            exit_code: error.exit_code(),
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::DryRunRunner;
    use std::path::PathBuf;

    fn config_in(dir: &std::path::Path) -> PipelineConfig {
        let mut config = PipelineConfig {
            project_root: dir.to_path_buf(),
            ..PipelineConfig::default()
        };
        config.toolchain.compiler = Some(PathBuf::from("clang-test"));
        config
    }

    #[test]
    fn dry_run_reaches_verified() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut pipeline = Pipeline::new(config_in(dir.path()), &DryRunRunner).expect("pipeline");

        assert_eq!(pipeline.run().expect("run"), Stage::Verified);
        assert_eq!(
            pipeline.state(),
            PipelineState::At {
                stage: Stage::Verified
            }
        );
        assert!(dir.path().join("build").is_dir());
    }

    #[test]
    fn plan_lists_remaining_stages_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut pipeline = Pipeline::new(config_in(dir.path()), &DryRunRunner).expect("pipeline");

        let stages: Vec<Stage> = pipeline
            .plan(Stage::Verified)
            .expect("plan")
            .into_iter()
            .map(|(stage, _)| stage)
            .collect();
        assert_eq!(
            stages,
            vec![Stage::BootstrapBuilt, Stage::Lifted, Stage::SelfHostBuilt, Stage::Verified]
        );
        assert_eq!(pipeline.state().reached(), Stage::Init);
    }

    #[test]
    fn run_until_stops_at_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut pipeline = Pipeline::new(config_in(dir.path()), &DryRunRunner).expect("pipeline");

        assert_eq!(pipeline.run_until(Stage::BootstrapBuilt).expect("run"), Stage::BootstrapBuilt);
        assert_eq!(pipeline.run_until(Stage::Lifted).expect("run"), Stage::Lifted);
        assert_eq!(pipeline.plan(Stage::Verified).expect("plan").len(), 2);
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let mut config = PipelineConfig::default();
        config.build.jobs = 0;
        assert!(matches!(
            Pipeline::new(config, &DryRunRunner),
            Err(FixpointError::Config(_))
        ));
    }
}
