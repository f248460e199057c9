//! # Command Execution
//!
//! Every external tool the pipeline touches goes through [`execute`]:
//!
//! 1. `Executing: <command>` is logged before launch.
//! 2. The command runs to completion with the caller's stdin/stdout/stderr,
//!    so nested tool output shows up live.
//! 3. A non-zero status logs `Error: <command>` and becomes
//!    [`FixpointError::StageInvocationFailed`] carrying that status.
//!
//! There is no retry, no timeout and no output capture. The runner behind
//! `execute` is a trait so stages can be driven without spawning processes.

use crate::{CommandLine, FixpointError};
use std::process::{Command, ExitStatus, Stdio};

// =============================================================================
// RUNNERS
// =============================================================================

/// Runs a command line to completion and reports its exit code.
pub trait CommandRunner {
    fn run(&self, command: &CommandLine) -> Result<i32, FixpointError>;
}

/// Spawns real processes, blocking until each one exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> Result<i32, FixpointError> {
        let mut process = Command::new(command.program());
        process
            .args(command.get_args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }

        let status = process.status().map_err(|source| FixpointError::Spawn {
            program: command.program().to_string_lossy().into_owned(),
            source,
        })?;

        Ok(status_code(status))
    }
}

/// Reports success for every command without running anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &CommandLine) -> Result<i32, FixpointError> {
        if let Some(dir) = command.get_current_dir() {
            tracing::debug!("(dry run, in {})", dir.display());
        }
        Ok(0)
    }
}

/// Exit code of a finished process. Signal deaths map to `128 + signal`.
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128_i32.saturating_add(signal);
        }
    }

    1
}

// =============================================================================
// EXECUTE
// =============================================================================

/// Run `command` and turn a non-zero status into an error.
///
/// Returns only when the command exited with status zero.
pub fn execute(runner: &dyn CommandRunner, command: &CommandLine) -> Result<(), FixpointError> {
    tracing::info!("Executing: {}", command);

    let code = runner.run(command).inspect_err(|e| {
        tracing::error!("Error: {} ({})", command, e);
    })?;

    if code != 0 {
        tracing::error!("Error: {}", command);
        return Err(FixpointError::StageInvocationFailed {
            command: command.to_string(),
            code,
        });
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
