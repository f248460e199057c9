//! # Fixpoint CLI Module
//!
//! This module implements the CLI interface for Fixpoint.
//!
//! ## Available Commands
//!
//! - `run` - Run the bootstrap pipeline (default)
//! - `plan` - Print the commands each stage would run
//! - `toolchain` - Print the secondary compiler that would be used

mod commands;

use crate::config::{Overrides, apply_overrides, load_config};
use clap::{Parser, Subcommand};
use fixpoint_core::{FixpointError, PipelineConfig, Stage};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Fixpoint - bootstrap a self-hosting compiler.
///
/// Builds stage-0 from the reference implementation, lifts the self-hosted
/// sources into stage-1, builds stage-2 with stage-1, then has stage-2
/// rebuild itself.
#[derive(Parser, Debug)]
#[command(name = "fixpoint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ./fixpoint.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root containing the bootstrap/ and src/ trees
    #[arg(short = 'C', long, global = true)]
    pub root: Option<PathBuf>,

    /// Build root, relative to the project root
    #[arg(short = 'B', long, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Parallel jobs for the stage-0 build
    #[arg(short, long, global = true)]
    pub jobs: Option<u32>,

    /// Use this secondary compiler instead of searching PATH
    #[arg(long, global = true)]
    pub compiler: Option<PathBuf>,

    /// Log commands without running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bootstrap pipeline
    Run {
        /// Stop after this stage (bootstrap, lift, self-host, verify)
        #[arg(short, long, default_value = "verify")]
        until: Stage,
    },

    /// Print the commands every stage would run
    Plan {
        /// Plan up to this stage
        #[arg(short, long, default_value = "verify")]
        until: Stage,
    },

    /// Print the resolved secondary compiler
    Toolchain,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            build_dir: self.build_dir.clone(),
            jobs: self.jobs,
            compiler: self.compiler.clone(),
        }
    }

    /// Config file plus command-line overrides.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, FixpointError> {
        let config = load_config(self.config.as_deref())?;
        Ok(apply_overrides(config, &self.overrides()))
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), FixpointError> {
    let config = cli.pipeline_config()?;
    let output = Output {
        json: cli.json,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Some(Commands::Run { until }) => cmd_run(config, output, until),
        Some(Commands::Plan { until }) => cmd_plan(config, output, until),
        Some(Commands::Toolchain) => cmd_toolchain(config, output),
        // No subcommand - full bootstrap by default
        None => cmd_run(config, output, Stage::Verified),
    }
}
