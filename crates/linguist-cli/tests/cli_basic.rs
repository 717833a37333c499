//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command in `data_dir` and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "linguist-cli", "--"])
        .args(args)
        .env("LINGUIST_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_state_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["state", "show"]);
    assert_eq!(code, 0, "state show failed");
    let state = json(&stdout);
    assert_eq!(state["hearts"], 5);
    assert_eq!(state["gems"], 100);
    assert_eq!(state["unlockedRegions"][0], "Sector Alpha");
}

/// Seed the save file from a fresh record with `edit` applied.
fn seed_state(data_dir: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
    let (stdout, _, code) = run_cli(data_dir, &["state", "show", "--today", "2025-03-12"]);
    assert_eq!(code, 0, "state show failed");
    let mut state = json(&stdout);
    edit(&mut state);
    std::fs::write(data_dir.join("game_state.json"), state.to_string()).unwrap();
}

#[test]
fn test_login_extends_streak() {
    let dir = tempfile::tempdir().unwrap();
    seed_state(dir.path(), |s| s["lastLoginDate"] = "2025-03-12".into());

    let (stdout, _, code) = run_cli(dir.path(), &["login", "--today", "2025-03-13"]);
    assert_eq!(code, 0, "login failed");
    let events = json(&stdout);
    assert_eq!(events[0]["type"], "StreakExtended");
    assert_eq!(events[0]["streak"], 2);

    let (stdout, _, _) = run_cli(dir.path(), &["login", "--today", "2025-03-13"]);
    assert_eq!(json(&stdout), serde_json::json!([]));
}

#[test]
fn test_missed_days_resolve_before_any_command() {
    let dir = tempfile::tempdir().unwrap();
    seed_state(dir.path(), |s| {
        s["lastLoginDate"] = "2025-03-09".into();
        s["streak"] = 9.into();
        for goal in s["dailyGoals"].as_array_mut().unwrap() {
            goal["isCompleted"] = true.into();
        }
    });
    let (stdout, _, code) = run_cli(dir.path(), &["goals", "complete", "daily_quest", "--today", "2025-03-12"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)[0]["reward_gems"], 20);

    let (stdout, _, _) = run_cli(dir.path(), &["shop", "buy", "streak_freeze", "--today", "2025-03-12"]);
    assert_eq!(json(&stdout)[0]["type"], "PowerupPurchased");

    // The gap was settled on the first command, so login has nothing left to do.
    let (stdout, _, _) = run_cli(dir.path(), &["login", "--today", "2025-03-12"]);
    assert_eq!(json(&stdout), serde_json::json!([]));

    let (stdout, _, _) = run_cli(dir.path(), &["streak", "--today", "2025-03-12"]);
    let summary = json(&stdout);
    assert_eq!(summary["streak"], 1);
    assert_eq!(summary["freezes"], 1);
}

#[test]
fn test_login_before_last_login_is_skew() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["login", "--today", "2000-01-01"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)[0]["type"], "ClockSkew");
}

#[test]
fn test_shop_buy_and_reject() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["shop", "buy", "xp_boost"]);
    assert_eq!(code, 0, "first purchase failed");
    assert_eq!(json(&stdout)[0]["type"], "PowerupPurchased");

    run_cli(dir.path(), &["shop", "buy", "xp_boost"]);
    // 100 - 50 - 50 = 0 gems left
    let (_, stderr, code) = run_cli(dir.path(), &["shop", "buy", "shield"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not enough gems"), "stderr: {stderr}");
}

#[test]
fn test_shop_use_passive_item_fails() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["shop", "buy", "streak_freeze"]);
    let (_, stderr, code) = run_cli(dir.path(), &["shop", "use", "streak_freeze"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot be activated"));
}

#[test]
fn test_goals_complete_once() {
    let dir = tempfile::tempdir().unwrap();
    seed_state(dir.path(), |s| s["lastLoginDate"] = "2025-03-12".into());
    let args = ["goals", "complete", "daily_quest", "--today", "2025-03-12"];
    let (stdout, _, code) = run_cli(dir.path(), &args);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)[0]["reward_gems"], 20);

    let (stdout, _, code) = run_cli(dir.path(), &args);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));
}

#[test]
fn test_streak_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["streak"]);
    assert_eq!(code, 0);
    let summary = json(&stdout);
    assert_eq!(summary["streak"], 1);
    assert_eq!(summary["xp_bonus_pct"], 5);
    assert_eq!(summary["rank"], "Rookie");
}

#[test]
fn test_arena_rps_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["arena", "rps", "rock"]);
    assert_eq!(code, 0);
    assert!(json(&stdout).is_array());
}

#[test]
fn test_arena_rejects_bad_choice() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["arena", "rps", "lizard"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "learner.language", "fr"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "learner.language"]);
    assert_eq!(stdout.trim(), "fr");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "learner.language", "Klingon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unsupported language"));
}

#[test]
fn test_quest_without_api_key_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(
        dir.path(),
        &["config", "set", "tutor.api_key_env", "LINGUIST_CLI_TEST_UNSET_KEY"],
    );
    let (_, stderr, code) = run_cli(dir.path(), &["quest", "play", "Volcanoes"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("API key not set"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("linguist"));
}
