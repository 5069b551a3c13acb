//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::{Command, Output};

fn run_planboard(store: &Path, extra_env: &[(&str, &str)], args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_planboard");
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .current_dir(store)
        .env("PLANBOARD_STORE", store)
        .env("PLANBOARD_IDENTITY", "alice")
        .env("PLANBOARD_UTC_OFFSET_MINUTES", "0")
        .env_remove("PLANBOARD_NOTIFY_URL")
        .env_remove("PLANBOARD_UNKNOWN_ID")
        .env_remove("PLANBOARD_WORKSPACE_TASKS")
        .env_remove("RUST_LOG");
    for (key, value) in extra_env {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run planboard binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Runs `add` and returns the new id.
fn add(store: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let output = run_planboard(store, &[], &full);
    assert!(output.status.success(), "add failed: {}", stderr(&output));
    stdout(&output).trim().strip_prefix("Created ").expect("created line").to_string()
}

fn today_at(time: &str) -> String {
    format!("{}T{time}", chrono::Utc::now().format("%Y-%m-%d"))
}

#[test]
fn list_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(dir.path(), &[], &["list"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "No tasks.\n");
}

#[test]
fn added_task_shows_in_list_and_today() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), &["Standup", "--category", "meeting", "--start", &today_at("23:59")]);

    let list = stdout(&run_planboard(dir.path(), &[], &["list"]));
    assert!(list.contains(&id));
    assert!(list.contains("Standup"));
    assert!(list.contains("meeting"));
    assert!(list.contains("1 task(s)."));

    let today = stdout(&run_planboard(dir.path(), &[], &["today"]));
    assert!(today.contains("Standup"));
}

#[test]
fn upcoming_respects_limit_and_order() {
    let dir = tempfile::tempdir().unwrap();
    for day in ["2099-01-03", "2099-01-01", "2099-01-02"] {
        add(dir.path(), &[&format!("Trip {day}"), "--start", day]);
    }
    add(dir.path(), &["Past", "--start", "2000-01-01"]);

    let out = stdout(&run_planboard(dir.path(), &[], &["upcoming", "--limit", "2"]));
    let first = out.find("Trip 2099-01-01").expect("first trip listed");
    let second = out.find("Trip 2099-01-02").expect("second trip listed");
    assert!(first < second);
    assert!(!out.contains("Trip 2099-01-03"));
    assert!(!out.contains("Past"));
}

#[test]
fn hide_filters_category_and_uncategorized_follow_work() {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), &["Gym", "--category", "personal"]);
    add(dir.path(), &["Untagged"]);

    let out = stdout(&run_planboard(dir.path(), &[], &["list", "--hide", "personal"]));
    assert!(!out.contains("Gym"));
    assert!(out.contains("Untagged"));

    let out = stdout(&run_planboard(dir.path(), &[], &["list", "--hide", "work"]));
    assert!(out.contains("Gym"));
    assert!(!out.contains("Untagged"));
}

#[test]
fn done_marks_task_complete() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), &["Taxes", "--category", "deadline"]);

    for _ in 0..2 {
        let output = run_planboard(dir.path(), &[], &["done", &id]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("personal store"));
    }

    let json = stdout(&run_planboard(dir.path(), &[], &["list", "--json"]));
    let tasks: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(tasks[0]["progress"], 100);
    assert_eq!(tasks[0]["status"], "done");
    assert_eq!(tasks[0]["color"], "#ef4444");
}

#[test]
fn delete_removes_task() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), &["Temp"]);
    let output = run_planboard(dir.path(), &[], &["delete", &id]);
    assert!(output.status.success());
    assert_eq!(stdout(&run_planboard(dir.path(), &[], &["list"])), "No tasks.\n");
}

#[test]
fn unknown_id_falls_back_to_personal_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(dir.path(), &[], &["delete", "ghost"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Task not found: ghost"));
}

#[test]
fn unknown_id_rejected_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(dir.path(), &[("PLANBOARD_UNKNOWN_ID", "reject")], &["done", "ghost"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not in the current view"));
}

#[test]
fn workspace_tasks_merge_and_route_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(
        dir.path(),
        &[],
        &["project", "acme", "site", "--name", "Website", "--emoji", "🌐"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let output = run_planboard(dir.path(), &[], &["assign", "acme", "site", "Launch"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let path = stdout(&output).trim().strip_prefix("Created ").unwrap().to_string();
    assert!(path.starts_with("workspaces/acme/projects/site/tasks/"));
    let id = path.rsplit('/').next().unwrap().to_string();

    run_planboard(dir.path(), &[], &["assign", "acme", "site", "Not mine", "--to", "bob"]);

    let list = stdout(&run_planboard(dir.path(), &[], &["list"]));
    assert!(list.contains("Launch"));
    assert!(list.contains("🌐 Website"));
    assert!(!list.contains("Not mine"));

    let output = run_planboard(dir.path(), &[], &["done", &id]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains(&format!("workspace store at {path}")));

    let off = stdout(&run_planboard(dir.path(), &[("PLANBOARD_WORKSPACE_TASKS", "false")], &["list"]));
    assert_eq!(off, "No tasks.\n");
}

#[test]
fn assign_to_missing_project_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(dir.path(), &[], &["assign", "acme", "nowhere", "Orphan"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown project"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_planboard(dir.path(), &[], &["nonsense"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unrecognized subcommand"));
}
