//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tickwatch"))
        .env("TICKWATCH_DATA_DIR", data_dir)
        .env_remove("TICKWATCH_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_status_defaults_to_idle_timer() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);

    let snapshot = json(&stdout);
    assert_eq!(snapshot["mode"], "timer");
    assert_eq!(snapshot["timer"]["total_ms"], 300_000);
    assert_eq!(snapshot["timer"]["phase"], "idle");
    assert_eq!(snapshot["stopwatch"]["elapsed_ms"], 0);
}

#[test]
fn test_timer_start_and_pause() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "start", "1:30"]);
    assert_eq!(code, 0);
    let event = json(&stdout);
    assert_eq!(event["type"], "TimerStarted");
    assert_eq!(event["duration_ms"], 90_000);

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "pause"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "TimerPaused");

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "status"]);
    let timer = json(&stdout);
    assert_eq!(timer["running"], false);
    assert_eq!(timer["total_ms"], 90_000);
    assert!(timer["remaining_ms"].as_u64().unwrap() <= 90_000);
}

#[test]
fn test_timer_start_rejects_zero() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["timer", "start", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Invalid duration"));
}

#[test]
fn test_set_duration_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["timer", "set", "00:10:00"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "adjust", "-30"]);
    let timer = json(&stdout);
    assert_eq!(timer["total_ms"], 570_000);
    assert_eq!(timer["remaining_ms"], 570_000);
}

#[test]
fn test_stopwatch_requires_stopwatch_mode() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["stopwatch", "start"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not active"));
}

#[test]
fn test_stopwatch_lap_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["mode", "stopwatch"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "ModeSwitched");

    let (code, _, _) = run_cli(dir.path(), &["stopwatch", "start"]);
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(dir.path(), &["stopwatch", "lap"]);
    assert_eq!(code, 0);
    let event = json(&stdout);
    assert_eq!(event["type"], "LapRecorded");
    assert_eq!(event["lap"]["index"], 0);

    let (code, stdout, _) = run_cli(dir.path(), &["stopwatch", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "StopwatchReset");

    let (_, stdout, _) = run_cli(dir.path(), &["stopwatch", "status"]);
    let sw = json(&stdout);
    assert_eq!(sw["elapsed_ms"], 0);
    assert_eq!(sw["laps"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_timer_commands_refused_in_stopwatch_mode() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["mode", "stopwatch"]);
    let (code, _, stderr) = run_cli(dir.path(), &["timer", "reset"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("The timer engine is not active"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "tick.interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "16");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.interval_ms", "50"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "tick.interval_ms"]);
    assert_eq!(stdout.trim(), "50");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.interval_ms", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_history_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["history"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));
}

fn history(data_dir: &Path) -> Vec<serde_json::Value> {
    let (code, stdout, _) = run_cli(data_dir, &["history"]);
    assert_eq!(code, 0);
    json(&stdout).as_array().cloned().unwrap_or_default()
}

fn wait_past_one_second_countdown() {
    std::thread::sleep(std::time::Duration::from_millis(1_500));
}

#[test]
fn test_countdown_finishing_between_commands_is_delivered_once() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["timer", "start", "1"]);
    assert_eq!(code, 0);
    wait_past_one_second_countdown();

    let (code, stdout, stderr) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);
    assert_eq!(stderr.matches("TimerFinished").count(), 1);
    let snapshot = json(&stdout);
    assert_eq!(snapshot["timer"]["phase"], "finished");
    assert_eq!(snapshot["timer"]["remaining_ms"], 0);

    let (_, _, stderr) = run_cli(dir.path(), &["status"]);
    assert!(!stderr.contains("TimerFinished"));

    let runs = history(dir.path());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["kind"], "timer");
    assert_eq!(runs[0]["duration_ms"], 1_000);
}

#[test]
fn test_finish_is_kept_when_the_next_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "start", "1"]);
    wait_past_one_second_countdown();

    let (code, stdout, stderr) = run_cli(dir.path(), &["stopwatch", "lap"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert_eq!(stderr.matches("TimerFinished").count(), 1);

    let (code, _, stderr) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(!stderr.contains("TimerFinished"));
    assert_eq!(history(dir.path()).len(), 1);
}

#[test]
fn test_command_after_finish_prints_one_document() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "start", "1"]);
    wait_past_one_second_countdown();

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "reset"]);
    assert_eq!(code, 0);
    let event = json(&stdout);
    assert_eq!(event["type"], "TimerReset");
}

#[test]
fn test_stopwatch_reset_records_session() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["mode", "stopwatch"]);
    run_cli(dir.path(), &["stopwatch", "start"]);
    std::thread::sleep(std::time::Duration::from_millis(50));
    let (code, _, _) = run_cli(dir.path(), &["stopwatch", "lap"]);
    assert_eq!(code, 0);
    run_cli(dir.path(), &["stopwatch", "reset"]);

    let runs = history(dir.path());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["kind"], "stopwatch");
    assert_eq!(runs[0]["laps"], 1);
    assert!(runs[0]["duration_ms"].as_u64().unwrap() > 0);
}

#[test]
fn test_stopwatch_restart_records_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["mode", "stopwatch"]);
    run_cli(dir.path(), &["stopwatch", "start"]);
    std::thread::sleep(std::time::Duration::from_millis(50));
    run_cli(dir.path(), &["stopwatch", "pause"]);

    let (code, stdout, _) = run_cli(dir.path(), &["stopwatch", "start"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "StopwatchStarted");

    let runs = history(dir.path());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["kind"], "stopwatch");
}
