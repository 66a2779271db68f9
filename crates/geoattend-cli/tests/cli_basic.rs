//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "geoattend-cli", "--"])
        .args(args)
        .env("GEOATTEND_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_list() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("config list should print JSON");
    assert!(parsed.get("tracker").is_some());
}

#[test]
fn test_config_get_set() {
    let (_, _, code) = run_cli(&["config", "set", "tracker.check_interval_secs", "30"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(&["config", "get", "tracker.check_interval_secs"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "30");

    let (_, _, code) = run_cli(&["config", "reset"]);
    assert_eq!(code, 0, "config reset failed");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_subject_lifecycle() {
    let (_, _, code) = run_cli(&["subject", "add", "E2E Subject"]);
    assert_eq!(code, 0, "subject add failed");

    let (stdout, _, code) = run_cli(&["subject", "list"]);
    assert_eq!(code, 0, "subject list failed");
    assert!(stdout.contains("E2E Subject"));

    let (_, _, code) = run_cli(&["subject", "remove", "E2E Subject"]);
    assert_eq!(code, 0, "subject remove failed");
}

#[test]
fn test_schedule_lifecycle() {
    let (stdout, _, code) = run_cli(&[
        "schedule",
        "add",
        "Monday",
        "E2E Physics",
        "09:00",
        "10:00",
        "--location",
        "Hall 1",
        "--lat",
        "12.9716",
        "--lng",
        "77.5946",
    ]);
    assert_eq!(code, 0, "schedule add failed");
    let id = stdout
        .trim()
        .rsplit(' ')
        .next()
        .expect("schedule add should print the slot id")
        .to_string();

    let (stdout, _, code) = run_cli(&["schedule", "list", "--day", "Monday"]);
    assert_eq!(code, 0, "schedule list failed");
    assert!(stdout.contains("E2E Physics"));

    let (_, _, code) = run_cli(&["schedule", "remove", &id]);
    assert_eq!(code, 0, "schedule remove failed");
}

#[test]
fn test_schedule_rejects_bad_times() {
    let (_, _, code) = run_cli(&[
        "schedule",
        "add",
        "Monday",
        "E2E Backwards",
        "10:00",
        "09:00",
        "--location",
        "Hall 1",
        "--lat",
        "0",
        "--lng",
        "0",
    ]);
    assert_ne!(code, 0, "backwards slot should be rejected");
}

#[test]
fn test_profile_show_and_set() {
    let (_, _, code) = run_cli(&["profile", "set-minimum", "80"]);
    assert_eq!(code, 0, "profile set-minimum failed");

    let (stdout, _, code) = run_cli(&["profile", "show"]);
    assert_eq!(code, 0, "profile show failed");
    assert!(stdout.contains("80%"));

    let (_, _, code) = run_cli(&["profile", "set-minimum", "75"]);
    assert_eq!(code, 0);
}

#[test]
fn test_attendance_summary() {
    let (stdout, _, code) = run_cli(&["attendance", "summary"]);
    assert_eq!(code, 0, "attendance summary failed");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("summary should print JSON");
    assert!(parsed.get("modified_percent").is_some());
    assert!(parsed.get("original_percent").is_some());
}

#[test]
fn test_attendance_toggle_missing_record_fails() {
    let (_, stderr, code) = run_cli(&["attendance", "toggle-status", "2000-01-01", "missing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no decision"));
}
