//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use fixpoint_core::{
    BuildArtifact, BuildLayout, CommandLine, CommandRunner, DryRunRunner, FixpointError, Pipeline,
    PipelineConfig, ProcessRunner, Stage,
};
use std::path::PathBuf;

/// How results are reported.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub dry_run: bool,
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn command_json(command: &CommandLine) -> serde_json::Value {
    serde_json::json!({
        "program": command.program().to_string_lossy(),
        "args": command
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        "cwd": command.get_current_dir().map(|d| d.display().to_string()),
    })
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Run the pipeline up to `until`.
pub fn cmd_run(config: PipelineConfig, output: Output, until: Stage) -> Result<(), FixpointError> {
    let runner: &dyn CommandRunner = if output.dry_run {
        &DryRunRunner
    } else {
        &ProcessRunner
    };

    let mut pipeline = Pipeline::new(config, runner)?;
    let result = pipeline.run_until(until);

    if output.json {
        print_json(&serde_json::json!({
            "target": until,
            "dry_run": output.dry_run,
            "result": pipeline.state(),
        }));
        return result.map(|_| ());
    }

    let reached = result?;
    if reached.is_terminal() {
        println!(
            "Self-hosting fixpoint verified: {}",
            pipeline
                .layout()
                .artifact(BuildArtifact::SelfHostCompiler)
                .display()
        );
    } else {
        println!("Reached stage: {}", reached);
    }
    Ok(())
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Files a stage leaves behind under the build root.
fn stage_artifacts(layout: &BuildLayout, stage: Stage) -> Vec<PathBuf> {
    BuildArtifact::ALL
        .into_iter()
        .filter(|artifact| artifact.produced_by() == stage)
        .map(|artifact| layout.artifact(artifact))
        .collect()
}

/// Print the commands the pipeline would run, without running them.
pub fn cmd_plan(config: PipelineConfig, output: Output, until: Stage) -> Result<(), FixpointError> {
    let mut pipeline = Pipeline::new(config, &DryRunRunner)?;
    let plan = pipeline.plan(until)?;
    let layout = pipeline.layout();

    if output.json {
        let stages: Vec<_> = plan
            .iter()
            .map(|(stage, commands)| {
                serde_json::json!({
                    "stage": stage,
                    "commands": commands.iter().map(command_json).collect::<Vec<_>>(),
                    "artifacts": stage_artifacts(layout, *stage)
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "stages": stages }));
        return Ok(());
    }

    for (stage, commands) in &plan {
        println!("[{}]", stage);
        for command in commands {
            match command.get_current_dir() {
                Some(dir) => println!("  (in {}) {}", dir.display(), command),
                None => println!("  {}", command),
            }
        }
        for artifact in stage_artifacts(layout, *stage) {
            println!("  => {}", artifact.display());
        }
    }
    Ok(())
}

// =============================================================================
// TOOLCHAIN COMMAND
// =============================================================================

/// Print the secondary compiler the lift stage would use.
pub fn cmd_toolchain(config: PipelineConfig, output: Output) -> Result<(), FixpointError> {
    let mut pipeline = Pipeline::new(config, &DryRunRunner)?;
    let toolchain = pipeline.toolchain()?;

    if output.json {
        let toolchain_config = &pipeline.config().toolchain;
        print_json(&serde_json::json!({
            "compiler": toolchain.path().display().to_string(),
            "search_order": toolchain_config.search_order,
            "explicit": toolchain_config.compiler.is_some(),
        }));
        return Ok(());
    }

    println!("{}", toolchain.path().display());
    Ok(())
}
