//! CLI integration tests for billard-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the billard-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("billard-migrate").unwrap()
}

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("health-check"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_serve_subcommand_help() {
    cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("[default: 3000]"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("billard-migrate"));
}

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/config.yaml", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_config_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // Source and target point at the same database.
    file.write_all(
        br#"
source:
  host: db.example.net
  database: billard
  user: postgres
target:
  host: db.example.net
  database: billard
  user: postgres
"#,
    )
    .unwrap();

    cmd()
        .args(["--config", &file.path().to_string_lossy(), "run"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("same database"));
}
