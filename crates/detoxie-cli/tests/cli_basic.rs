//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(dir: &TempDir, args: &[&str], stdin: Option<&str>) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_detoxie-cli"))
        .args(args)
        .env("DETOXIE_DATA_DIR", dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
    } else {
        drop(child.stdin.take());
    }
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

#[test]
fn test_config_get_default() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "get", "timer_minutes"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["config", "set", "overlay.title", "Enough for today"], None);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "overlay.title"], None);
    assert_eq!(stdout.trim(), "Enough for today");

    let (code, _, _) = run_cli(&dir, &["config", "reset"], None);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "overlay.title"], None);
    assert_eq!(stdout.trim(), "Time's up!");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["config", "get", "no_such_key"], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list_is_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "list"], None);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["vacation_mode"], false);
}

#[test]
fn test_replay_then_stats() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"kind":"connected","at":"2026-10-14T10:00:00+00:00"}"#,
        "\n",
        r#"{"kind":"section","platform":"youtube","active":true,"at":"2026-10-14T10:00:00+00:00"}"#,
        "\n",
        r#"{"kind":"section","platform":"youtube","active":false,"at":"2026-10-14T10:00:45+00:00"}"#,
        "\n",
    );
    let (code, stdout, _) = run_cli(&dir, &["replay"], Some(input));
    assert_eq!(code, 0);
    assert!(stdout.contains("Entered Shorts"));
    assert!(stdout.contains("Left Shorts"));

    let (code, stdout, _) = run_cli(&dir, &["stats", "all"], None);
    assert_eq!(code, 0);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["total_time_ms"], 45_000);
    assert_eq!(stats["session_count"], 1);
}

#[test]
fn test_replay_memory_leaves_no_stats() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        r#"{"kind":"section","platform":"instagram","active":true,"at":"2026-10-14T10:00:00+00:00"}"#,
        "\n",
        r#"{"kind":"section","platform":"instagram","active":false,"at":"2026-10-14T10:00:10+00:00"}"#,
        "\n",
    );
    let (code, _, _) = run_cli(&dir, &["replay", "--memory"], Some(input));
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&dir, &["stats", "all"], None);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["session_count"], 0);
}

#[test]
fn test_stats_today_starts_empty() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["stats", "today"], None);
    assert_eq!(code, 0);
    let today: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(today["total_ms"], 0);
    assert_eq!(today["limit_reached"], false);
}

#[test]
fn test_replay_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.ndjson");
    let (code, _, stderr) = run_cli(&dir, &["replay", "--file", missing.to_str().unwrap()], None);
    assert_ne!(code, 0);
    assert!(stderr.starts_with("error:"));
}
