//! # System Module
//!
//! Pipeline stage definitions and the run state machine.

mod stage;

pub use stage::*;
