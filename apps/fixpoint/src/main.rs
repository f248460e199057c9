//! # Fixpoint - Self-Hosting Bootstrap Driver
//!
//! Brings a self-hosting compiler up from its reference implementation and
//! checks that the self-built compiler can rebuild itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/fixpoint (THE BINARY)               │
//! │                                                           │
//! │   ┌─────────────┐     ┌──────────────┐     ┌──────────┐   │
//! │   │    CLI      │     │    Config    │     │ Logging  │   │
//! │   │   (clap)    │     │   (toml)     │     │(tracing) │   │
//! │   └──────┬──────┘     └──────┬───────┘     └──────────┘   │
//! │          └─────────┬─────────┘                            │
//! │                    ▼                                      │
//! │            ┌───────────────┐                              │
//! │            │ fixpoint-core │                              │
//! │            │  (THE LOGIC)  │                              │
//! │            └───────────────┘                              │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Full bootstrap: stage-0, lift, self-host, verify
//! fixpoint run
//!
//! # Stop once stage-1 exists
//! fixpoint run --until lift
//!
//! # Show the commands without running them
//! fixpoint plan --json
//!
//! # Show which clang would be used
//! fixpoint toolchain
//! ```

mod cli;
mod config;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    // The only place a pipeline failure becomes a process exit status.
    match cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // One ERROR line per failure: command failures were logged by the executor.
            if !e.already_logged() {
                tracing::error!("Error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initialize tracing. FIXPOINT_LOG_FORMAT=json enables machine-parseable output.
///
/// Logs go to stderr; stdout is reserved for `plan`/`toolchain` output.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("FIXPOINT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_directive = if verbose {
        "fixpoint=debug,fixpoint_core=debug"
    } else {
        "fixpoint=info,fixpoint_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("FIXPOINT_LOG")
        .unwrap_or_else(|_| default_directive.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
