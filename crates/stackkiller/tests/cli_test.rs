#![allow(deprecated)] // TODO: migrate Command::cargo_bin to the cargo_bin_cmd! macro

use assert_cmd::Command;
use predicates::prelude::*;

fn stackkiller() -> Command {
    let mut cmd = Command::cargo_bin("stackkiller").unwrap();
    cmd.env_remove("STACKKILLER_STACK")
        .env_remove("STACKKILLER_CONFIG_PATH");
    cmd
}

/// Top-level help lists every subcommand
#[test]
fn test_cli_help() {
    stackkiller()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deletes an AWS stack"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("resources"));
}

#[test]
fn test_cli_version() {
    stackkiller()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackkiller"));
}

#[test]
fn test_delete_help() {
    stackkiller()
        .args(["delete", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--stack"))
        .stdout(predicate::str::contains("--no-force"))
        .stdout(predicate::str::contains("--local"))
        .stdout(predicate::str::contains("--max-wait"));
}

#[test]
fn test_resources_help() {
    stackkiller()
        .args(["resources", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--failed"));
}

/// A missing stack name is a usage error
#[test]
fn test_delete_requires_stack() {
    stackkiller()
        .arg("delete")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--stack"));
}

#[test]
fn test_invalid_max_wait_is_usage_error() {
    stackkiller()
        .args(["delete", "-s", "demo", "--max-wait", "soon"])
        .assert()
        .code(2);
}

/// An unreadable settings file fails before any request is made
#[test]
fn test_missing_config_file_fails() {
    stackkiller()
        .args(["status", "-s", "demo", "--config", "/nonexistent/stackkiller.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("stackkiller.yaml");
    std::fs::write(&path, "wait:\n  poll_interval_seconds: 0\n").unwrap();

    stackkiller()
        .args(["delete", "-s", "demo", "--local", "--config"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("poll_interval_seconds"));
}
