//! Integration tests for the command-line binary.
//!
//! These run the built `dr-database` executable against an in-memory app
//! database, so no warehouse or completion service is reached.

use std::process::Command;

fn dr_database() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dr-database"));
    cmd.env_remove("RUST_LOG")
        .env("DRDB_APP_DATABASE", "sqlite::memory:")
        .env("DRDB_LOG_LEVEL", "off")
        .env("GEMINI_API_KEY", "test-key");
    cmd
}

/// Test that a failed `ask` reports its error once and exits non-zero
#[test]
fn test_failed_ask_reports_once() {
    let output = dr_database()
        .args(["ask", "describe the tables", "--intent", "metadata"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(
        stderr.matches("No warehouse connection configured").count(),
        1,
        "{stderr}"
    );
    let report: serde_json::Value = serde_json::from_str(&stderr).unwrap();
    assert_eq!(report["intent"], "metadata");
    assert!(report["suggestion"].is_string());
}

/// Test that an unconfigured `test` reports the outcome and exits cleanly
#[test]
fn test_unconfigured_test_command_succeeds() {
    let output = dr_database().arg("test").output().unwrap();

    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["success"], false);
}
