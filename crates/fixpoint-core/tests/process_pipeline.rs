//! # Real Process Tests
//!
//! Runs the bootstrap stage through [`ProcessRunner`] with stand-in tools.
//! `sh` plays cmake: it is handed the "bootstrap source" as its first
//! argument, so pointing `bootstrap_source` at a shell script lets each test
//! decide what the build-configuration step does. `true`/`false` play make.

#![cfg(unix)]

use fixpoint_core::{FixpointError, Pipeline, PipelineConfig, ProcessRunner, Stage};
use std::path::{Path, PathBuf};

fn config_with_configure_script(dir: &Path, script: &str, make: &str) -> PipelineConfig {
    std::fs::write(dir.join("configure.sh"), script).expect("write script");

    let mut config = PipelineConfig {
        project_root: dir.to_path_buf(),
        bootstrap_source: PathBuf::from("configure.sh"),
        ..PipelineConfig::default()
    };
    config.build.cmake = PathBuf::from("sh");
    config.build.make = PathBuf::from(make);
    config.toolchain.compiler = Some(PathBuf::from("clang"));
    config
}

#[test]
fn configure_exit_status_propagates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_configure_script(dir.path(), "exit 2\n", "true");
    let mut pipeline = Pipeline::new(config, &ProcessRunner).expect("pipeline");

    let err = pipeline.run().expect_err("configure fails");
    assert!(matches!(err, FixpointError::StageInvocationFailed { code: 2, .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(pipeline.state().reached(), Stage::Init);
    assert!(dir.path().join("build").is_dir());
    assert!(!dir.path().join("build/colgm_lifted").exists());
}

#[test]
fn bootstrap_runs_inside_build_root_without_chdir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_configure_script(dir.path(), "touch configured\n", "true");
    let cwd_before = std::env::current_dir().expect("cwd");

    let mut pipeline = Pipeline::new(config, &ProcessRunner).expect("pipeline");
    assert_eq!(
        pipeline.run_until(Stage::BootstrapBuilt).expect("bootstrap"),
        Stage::BootstrapBuilt
    );

    assert!(dir.path().join("build/configured").exists());
    assert_eq!(std::env::current_dir().expect("cwd"), cwd_before);
}

#[test]
fn build_tool_failure_stops_bootstrap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_configure_script(dir.path(), "exit 0\n", "false");
    let mut pipeline = Pipeline::new(config, &ProcessRunner).expect("pipeline");

    let err = pipeline.run().expect_err("make fails");
    assert_eq!(err.exit_code(), 1);
    assert!(pipeline.state().is_aborted());
}

#[test]
fn missing_build_tool_is_spawn_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_configure_script(
        dir.path(),
        "exit 0\n",
        "fixpoint-test-no-such-make-9c1e",
    );
    let mut pipeline = Pipeline::new(config, &ProcessRunner).expect("pipeline");

    let err = pipeline.run_until(Stage::BootstrapBuilt).expect_err("no make");
    assert!(matches!(err, FixpointError::Spawn { .. }));
    assert_eq!(err.exit_code(), 1);
}
