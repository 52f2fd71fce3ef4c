//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `rebalance` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("rebalance").unwrap()
}

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("benchmark"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rebalance"));
}

#[test]
fn benchmark_no_config_prints_defaults_and_requires_data() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["benchmark", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"strategies\""))
        .stdout(predicate::str::contains("\"cross_validation\""))
        .stderr(predicate::str::contains("No config file provided"));
}

#[test]
fn benchmark_nonexistent_config_errors() {
    cmd()
        .args(["benchmark", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn benchmark_rejects_unknown_strategy() {
    cmd()
        .args(["benchmark", "--strategy", "focal_loss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("focal_loss"));
}

#[test]
fn benchmark_synthetic_run_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{
            "synthetic": {"enabled": true, "n_samples": 120, "n_features": 3, "majority_ratios": [0.8]},
            "strategies": [{"method": "count_weighting"}, {"method": "random_oversampling"}],
            "num_epochs": 2,
            "batch_size": 32,
            "cross_validation": {"n_splits": 3, "n_repeats": 1}
        }"#,
    )
    .unwrap();

    cmd()
        .arg("benchmark")
        .arg(&config_path)
        .arg("-o")
        .arg(dir.path())
        .arg("--no-report")
        .assert()
        .success();

    assert!(dir.path().join("rebalance_scores.tsv").exists());
    assert!(dir.path().join("rebalance_summary.json").exists());
    assert!(!dir.path().join("rebalance_report.html").exists());
}
