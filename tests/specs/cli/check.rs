//! `reincarnated check` specs
//!
//! Validate rule files without touching any job.

use crate::prelude::*;

#[test]
fn valid_config_prints_summary() {
    let state = StateDir::empty();
    let path = state.config(
        r#"
cron = "* * * * *"
active = true
regex = ["reg ex one"]

[[rule]]
kind = "failure_cause"
value = "oom"
master_action = "echo restarting"
"#,
    );

    cli()
        .args(&["check", "--config", path.to_str().unwrap()])
        .passes()
        .stdout_has(": ok")
        .stdout_has("rules:            2")
        .stdout_has("1. regex \"reg ex one\"")
        .stdout_has("2. failure_cause \"oom\" master_action");
}

#[test]
fn malformed_regex_is_rejected() {
    let state = StateDir::empty();
    let path = state.config("active = true\nregex = [\"(unclosed\"]\n");

    cli()
        .args(&["check", "--config", path.to_str().unwrap()])
        .fails()
        .code(2)
        .stderr_has("invalid regex '(unclosed'");
}

#[test]
fn unknown_rule_kind_is_rejected() {
    let state = StateDir::empty();
    let path = state.config("[[rule]]\nkind = \"sometimes\"\nvalue = \"x\"\n");

    cli()
        .args(&["check", "--config", path.to_str().unwrap()])
        .fails()
        .stderr_has("unknown rule kind 'sometimes'");
}

#[test]
fn malformed_cron_is_accepted_with_note() {
    let state = StateDir::empty();
    let path = state.config("cron = \"not a cron\"\nactive = true\nregex = [\"x\"]\n");

    cli()
        .args(&["check", "--config", path.to_str().unwrap()])
        .passes()
        .stdout_has("(ignored:")
        .stdout_has("next fire:        never");
}

#[test]
fn default_config_path_comes_from_state_dir() {
    let state = StateDir::empty();
    state.config("active = false\n");

    cli().args(&["check"]).state(&state).passes().stdout_has("config.toml: ok");
}

#[test]
fn missing_config_fails() {
    let state = StateDir::empty();
    cli().args(&["check"]).state(&state).fails().stderr_has("failed to read");
}
