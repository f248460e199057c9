//! # Pipeline Stages
//!
//! The bootstrap is a strictly forward state machine:
//!
//! | Stage | Name | Artifact left behind |
//! |-------|------|----------------------|
//! | Init | Nothing built | none |
//! | BootstrapBuilt | Stage-0 | `build/colgm` |
//! | Lifted | Stage-1 | `build/colgm_lifted.ll`, `build/colgm_lifted` |
//! | SelfHostBuilt | Stage-2 | `build/colgm_self_host` |
//! | Verified | Fixpoint | `build/colgm_self_host` (rebuilt by itself) |
//!
//! There are no cycles and no rollback. Any failure moves the pipeline into
//! [`PipelineState::Aborted`], which is terminal.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Progress points of the bootstrap, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Nothing has run yet.
    #[serde(rename = "init")]
    Init,
    /// Stage-0 compiler built from the reference implementation.
    #[serde(rename = "bootstrap")]
    BootstrapBuilt,
    /// Stage-1 compiler lifted through IR and the secondary compiler.
    #[serde(rename = "lift")]
    Lifted,
    /// Stage-2 compiler built by stage-1.
    #[serde(rename = "self-host")]
    SelfHostBuilt,
    /// Stage-2 rebuilt itself: the fixpoint holds.
    #[serde(rename = "verify")]
    Verified,
}

impl Stage {
    /// Every stage, in order.
    pub const ALL: [Stage; 5] = [
        Stage::Init,
        Stage::BootstrapBuilt,
        Stage::Lifted,
        Stage::SelfHostBuilt,
        Stage::Verified,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::BootstrapBuilt => "bootstrap",
            Stage::Lifted => "lift",
            Stage::SelfHostBuilt => "self-host",
            Stage::Verified => "verify",
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::BootstrapBuilt),
            Stage::BootstrapBuilt => Some(Stage::Lifted),
            Stage::Lifted => Some(Stage::SelfHostBuilt),
            Stage::SelfHostBuilt => Some(Stage::Verified),
            Stage::Verified => None,
        }
    }

    /// Check if this stage is terminal (Verified).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Verified)
    }

    /// Whether reaching this stage requires the secondary compiler.
    #[must_use]
    pub fn needs_toolchain(&self) -> bool {
        *self >= Stage::Lifted
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Stage::ALL.iter().map(|st| st.name()).collect();
                format!("unknown stage '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

// =============================================================================
// PIPELINE STATE
// =============================================================================

/// Where a pipeline run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PipelineState {
    /// The last stage that completed successfully.
    At { stage: Stage },
    /// A stage failed; `reached` is the last stage that completed.
    Aborted { reached: Stage, exit_code: u8 },
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::At { stage: Stage::Init }
    }
}

impl PipelineState {
    /// The last stage completed, whether or not the run was aborted afterwards.
    #[must_use]
    pub fn reached(&self) -> Stage {
        match self {
            PipelineState::At { stage } => *stage,
            PipelineState::Aborted { reached, .. } => *reached,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, PipelineState::Aborted { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
