//! # Core Type Definitions
//!
//! This module contains the small set of types the pipeline passes around:
//! - Build artifacts and where they live (`BuildArtifact`)
//! - External command lines (`CommandLine`)
//! - Error types (`FixpointError`)
//!
//! The state that actually matters lives outside the process: files under the
//! build root and the exit codes of invoked tools. These types only name it.

use crate::system::Stage;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// BUILD ARTIFACTS
// =============================================================================

/// A file produced by exactly one stage under the build root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildArtifact {
    /// Stage-0: the reference-implementation compiler built by cmake/make.
    BootstrapCompiler,
    /// Textual IR emitted by stage-0 for the self-hosted sources.
    LiftedIr,
    /// Stage-1: the IR linked into a native binary by the secondary compiler.
    LiftedCompiler,
    /// Stage-2: the self-hosted compiler built by stage-1, rebuilt by itself on verify.
    SelfHostCompiler,
}

impl BuildArtifact {
    /// All artifacts, in production order.
    pub const ALL: [BuildArtifact; 4] = [
        BuildArtifact::BootstrapCompiler,
        BuildArtifact::LiftedIr,
        BuildArtifact::LiftedCompiler,
        BuildArtifact::SelfHostCompiler,
    ];

    /// File name of the artifact inside the build root.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            BuildArtifact::BootstrapCompiler => "colgm",
            BuildArtifact::LiftedIr => "colgm_lifted.ll",
            BuildArtifact::LiftedCompiler => "colgm_lifted",
            BuildArtifact::SelfHostCompiler => "colgm_self_host",
        }
    }

    /// The stage whose completion leaves this artifact on disk.
    #[must_use]
    pub fn produced_by(&self) -> Stage {
        match self {
            BuildArtifact::BootstrapCompiler => Stage::BootstrapBuilt,
            BuildArtifact::LiftedIr | BuildArtifact::LiftedCompiler => Stage::Lifted,
            BuildArtifact::SelfHostCompiler => Stage::SelfHostBuilt,
        }
    }
}

impl fmt::Display for BuildArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildArtifact::BootstrapCompiler => "bootstrap compiler",
            BuildArtifact::LiftedIr => "lifted IR",
            BuildArtifact::LiftedCompiler => "lifted compiler",
            BuildArtifact::SelfHostCompiler => "self-host compiler",
        };
        f.write_str(name)
    }
}

// =============================================================================
// COMMAND LINE
// =============================================================================

/// An external command: program, arguments and the directory it runs in.
///
/// The working directory is carried by the command itself so that no stage
/// ever has to change the process-wide current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl CommandLine {
    /// Start a command line for `program` with no arguments.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the command inside `dir` instead of the inherited directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Whether any argument equals `needle`.
    #[must_use]
    pub fn has_arg(&self, needle: impl AsRef<OsStr>) -> bool {
        let needle = needle.as_ref();
        self.args.iter().any(|a| a == needle)
    }

    /// The argument that follows `flag`, e.g. the path after `-o`.
    #[must_use]
    pub fn value_of(&self, flag: impl AsRef<OsStr>) -> Option<&OsStr> {
        let flag = flag.as_ref();
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i.saturating_add(1)))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can stop the pipeline.
///
/// None of these are recovered from inside the pipeline. They travel up to
/// the binary's entry point, which turns them into a process exit status via
/// [`FixpointError::exit_code`].
#[derive(Debug, Error)]
pub enum FixpointError {
    /// No acceptable secondary compiler was found on the search path.
    #[error("clang not found in {searched} search path entries")]
    ToolchainNotFound { searched: usize },

    /// An external process returned a non-zero status.
    #[error("{command} failed with exit code {code}")]
    StageInvocationFailed { command: String, code: i32 },

    /// An external process could not be launched at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A filesystem operation on the build tree failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stage was requested after an earlier stage already failed.
    #[error("pipeline aborted after reaching {reached}")]
    PipelineAborted { reached: Stage },

    /// A stage that links with the secondary compiler was planned without one.
    #[error("stage {stage} requires a resolved secondary compiler")]
    ToolchainRequired { stage: Stage },
}

impl FixpointError {
    /// The status the hosting process should exit with.
    ///
    /// A failed invocation passes its own code through; everything else is 1.
    /// Codes outside `1..=255` cannot be represented portably and collapse to 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            FixpointError::StageInvocationFailed { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }

    /// Whether [`execute`](crate::execute) already logged this failure.
    ///
    /// Invocation and launch failures are reported next to the command that
    /// caused them; the entry point reports everything else.
    #[must_use]
    pub fn already_logged(&self) -> bool {
        matches!(
            self,
            FixpointError::StageInvocationFailed { .. } | FixpointError::Spawn { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixpointError::Io {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_display_joins_with_spaces() {
        let cmd = CommandLine::new("make").arg("-j6");
        assert_eq!(cmd.to_string(), "make -j6");
    }

    #[test]
    fn command_line_value_of_flag() {
        let cmd = CommandLine::new("clang")
            .args(["in.ll", "-o", "out"])
            .arg("-g");
        assert_eq!(cmd.value_of("-o"), Some(OsStr::new("out")));
        assert_eq!(cmd.value_of("-g"), None);
        assert!(cmd.has_arg("in.ll"));
    }

    #[test]
    fn exit_code_passes_through_failed_status() {
        let err = FixpointError::StageInvocationFailed {
            command: "cmake".into(),
            code: 2,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_clamps_unrepresentable_status() {
        let err = FixpointError::StageInvocationFailed {
            command: "x".into(),
            code: 300,
        };
        assert_eq!(err.exit_code(), 1);

        let err = FixpointError::StageInvocationFailed {
            command: "x".into(),
            code: -1,
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn toolchain_not_found_is_one() {
        let err = FixpointError::ToolchainNotFound { searched: 3 };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "clang not found in 3 search path entries");
        assert!(!err.already_logged());
    }

    #[test]
    fn only_command_failures_count_as_logged() {
        let failed = FixpointError::StageInvocationFailed {
            command: "make -j6".into(),
            code: 2,
        };
        let spawn = FixpointError::Spawn {
            program: "cmake".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(failed.already_logged());
        assert!(spawn.already_logged());
        assert!(!FixpointError::Config("jobs must be > 0".into()).already_logged());
        assert!(
            !FixpointError::PipelineAborted {
                reached: Stage::Init
            }
            .already_logged()
        );
    }

    #[test]
    fn artifact_file_names() {
        assert_eq!(BuildArtifact::BootstrapCompiler.file_name(), "colgm");
        assert_eq!(BuildArtifact::LiftedIr.file_name(), "colgm_lifted.ll");
        assert_eq!(
            BuildArtifact::SelfHostCompiler.produced_by(),
            Stage::SelfHostBuilt
        );
    }
}
