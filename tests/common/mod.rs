//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;

/// Helper to get a flowrate command
pub fn flowrate() -> Command {
    Command::new(cargo::cargo_bin!("flowrate"))
}

/// Run a subcommand on a JSON document and parse the JSON it prints
pub fn solve_json(subcommand: &str, input: &str) -> serde_json::Value {
    let output = flowrate()
        .arg(subcommand)
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{} exited with {:?}",
        subcommand,
        output.status
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Run a subcommand and return its raw stdout bytes
pub fn solve_raw(subcommand: &str, input: &str) -> Vec<u8> {
    let output = flowrate()
        .arg(subcommand)
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());
    output.stdout
}

/// Assert two floats agree to within solver tolerance
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
