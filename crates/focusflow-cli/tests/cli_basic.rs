//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory
//! and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusflow-cli"))
        .args(args)
        .env("FOCUSFLOW_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_timer_status_defaults() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);

    let snap = json(&stdout);
    assert_eq!(snap["phase"], "work");
    assert_eq!(snap["remaining_secs"], 1500);
    assert_eq!(snap["running"], false);
    assert_eq!(snap["label"], "Work");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "workMinutes", "40"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "workMinutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "40");

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(json(&stdout)["remaining_secs"], 2400);
}

#[test]
fn test_config_rejects_out_of_range_value() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "shortBreakMinutes", "31"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "shortBreakMinutes"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("theme"), "stderr: {stderr}");
}

#[test]
fn test_config_list_and_reset() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "pomodorosUntilLongBreak", "6"]);

    let (_, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(json(&stdout)["timer"]["pomodorosUntilLongBreak"], 6);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(json(&stdout)["timer"]["pomodorosUntilLongBreak"], 4);
}

#[test]
fn test_stats_on_empty_log() {
    let dir = TempDir::new().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["stats", "all"]);
    assert_eq!(code, 0);
    let all = json(&stdout);
    assert_eq!(all["streak"], 0);
    assert_eq!(all["today"]["count"], 0);
    assert_eq!(all["achievements"].as_array().unwrap().len(), 0);

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "days", "--days", "3"]);
    let days = json(&stdout);
    assert_eq!(days.as_array().unwrap().len(), 3);
    assert!(days.as_array().unwrap().iter().all(|d| d["count"] == 0));

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(json(&stdout)["streak"], 0);
}

#[test]
fn test_history_on_empty_log() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["history", "--limit", "5"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));
    assert!(dir.path().join("focusflow.db").exists());
}
