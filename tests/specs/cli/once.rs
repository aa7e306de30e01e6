//! `reincarnated once` specs
//!
//! A single tick against a file-system state directory.

use crate::prelude::*;

const EVERY_MINUTE: &str = r#"
cron = "* * * * *"
active = true
regex = ["reg ex one"]
"#;

#[test]
fn failed_job_matching_regex_is_restarted() {
    let state = StateDir::empty();
    state.config(EVERY_MINUTE);
    state.job("test_job", failed_build("test_job", "checkout\nreg ex one\nFinished: FAILURE"));
    state.job("green", json!({
        "job": "green",
        "number": 3,
        "result": "SUCCESS",
        "timestamp": "2026-01-05T08:55:00Z",
    }));

    let run = cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();

    let report = run.json();
    assert_eq!(report["restarted"][0]["job"], "test_job");
    assert_eq!(report["restarted"][0]["rule"], "reg ex one");
    assert_eq!(report["restarted"].as_array().unwrap().len(), 1);
    let restarts = state.restarts();
    assert_eq!(restarts.len(), 1);
    assert_eq!(restarts[0]["job"], "test_job");
    assert_eq!(restarts[0]["cause"]["short_description"], "PeriodicReincarnation");
}

#[test]
fn outstanding_restart_blocks_second_run() {
    let state = StateDir::empty();
    state.config(EVERY_MINUTE);
    state.job("test_job", failed_build("test_job", "reg ex one"));

    cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();
    let second = cli().args(&["once", "--at", "2026-01-05T09:01:00Z"]).state(&state).passes();

    assert!(second.json()["restarted"].as_array().unwrap().is_empty());
    assert_eq!(second.json()["skipped"][0]["reason"], "already_in_flight");
    assert_eq!(state.restarts().len(), 1);
}

#[test]
fn completion_marker_makes_job_eligible_again() {
    let state = StateDir::empty();
    state.config(EVERY_MINUTE);
    state.job("test_job", failed_build("test_job", "reg ex one"));

    cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();
    state.file("completed/test_job", "");
    let second = cli().args(&["once", "--at", "2026-01-05T09:01:00Z"]).state(&state).passes();

    assert_eq!(second.json()["restarted"][0]["job"], "test_job");
    assert_eq!(state.restarts().len(), 1);
}

#[test]
fn off_schedule_instant_does_nothing() {
    let state = StateDir::empty();
    state.config("cron = \"0 3 * * *\"\nactive = true\nregex = [\"reg ex one\"]\n");
    state.job("test_job", failed_build("test_job", "reg ex one"));

    let run = cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();

    assert_eq!(run.json()["fired"], false);
    assert!(state.restarts().is_empty());
}

#[test]
fn log_file_referenced_by_path_is_read() {
    let state = StateDir::empty();
    state.config(EVERY_MINUTE);
    state.file("logs/test_job/12.log", "compiling\nreg ex one\n");
    state.job("test_job", json!({
        "job": "test_job",
        "number": 12,
        "result": "FAILURE",
        "log": { "path": "logs/test_job/12.log" },
        "timestamp": "2026-01-05T08:55:00Z",
    }));

    let run = cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();

    assert_eq!(run.json()["restarted"][0]["job"], "test_job");
}

#[test]
fn missing_config_leaves_supervisor_inactive() {
    let state = StateDir::empty();
    state.job("test_job", failed_build("test_job", "reg ex one"));

    let run = cli().args(&["once", "--at", "2026-01-05T09:00:00Z"]).state(&state).passes();

    assert_eq!(run.json()["active"], false);
    assert!(state.restarts().is_empty());
}
