// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const FULL_CONFIG: &str = r#"
cron = "* * * * *"
active = true
no_change = true
log_info = true
max_depth = 3

[[rule]]
kind = "regex"
value = "reg ex one"

[[rule]]
kind = "failure_cause"
value = "oom"
description = "out of memory"
cron = "*/5 * * * *"
node_action = "rm -rf ~/.cache/build"

[[rule]]
kind = "no_change"
master_action = "echo stuck"
"#;

#[test]
fn parses_full_config() {
    let config = parse_config(FULL_CONFIG).unwrap();
    assert_eq!(config.cron_expression.as_deref(), Some("* * * * *"));
    assert!(config.active);
    assert!(config.restart_unchanged_jobs_enabled);
    assert!(config.log_info_enabled);
    assert!(!config.include_unstable);
    assert_eq!(config.max_depth, 3);

    assert_eq!(config.rules.len(), 3);
    assert_eq!(config.rules[0].value, "reg ex one");
    assert_eq!(config.rules[1].description, "out of memory");
    assert_eq!(config.rules[1].cron_override.as_deref(), Some("*/5 * * * *"));
    assert_eq!(config.rules[1].node_action.as_deref(), Some("rm -rf ~/.cache/build"));
    assert!(config.rules[2].is_no_change());
    assert_eq!(config.rules[2].master_action.as_deref(), Some("echo stuck"));
}

#[test]
fn empty_document_is_inactive_default() {
    let config = parse_config("").unwrap();
    assert!(!config.active);
    assert!(config.cron_expression.is_none());
    assert!(config.rules.is_empty());
}

#[test]
fn regex_shorthand_precedes_rule_tables() {
    let config = parse_config(
        r#"
regex = ["first", "second"]

[[rule]]
kind = "failure_cause"
value = "third"
"#,
    )
    .unwrap();
    let values: Vec<_> = config.rules.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["first", "second", "third"]);
}

#[test]
fn no_change_flag_appends_implicit_rule() {
    let config = parse_config("no_change = true\nregex = [\"x\"]").unwrap();
    assert_eq!(config.rules.len(), 2);
    assert!(config.rules[1].is_no_change());
}

#[test]
fn explicit_no_change_rule_is_not_duplicated() {
    let config = parse_config("no_change = true\n[[rule]]\nkind = \"no_change\"").unwrap();
    assert_eq!(config.rules.iter().filter(|r| r.is_no_change()).count(), 1);
}

#[test]
fn blank_optionals_are_absent() {
    let config = parse_config(
        r#"
cron = "  "

[[rule]]
kind = "regex"
value = "x"
description = ""
cron = ""
node_action = " "
"#,
    )
    .unwrap();
    assert!(config.cron_expression.is_none());
    let rule = &config.rules[0];
    assert_eq!(rule.description, "x");
    assert!(rule.cron_override.is_none());
    assert!(rule.node_action.is_none());
}

#[test]
fn malformed_regex_reports_rule_index() {
    let err = parse_config("regex = [\"ok\", \"(\"]").unwrap_err();
    match err {
        ConfigError::Rule { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, ConfigError::InvalidRegex { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[yare::parameterized(
    unknown_kind  = { "[[rule]]\nkind = \"sometimes\"\nvalue = \"x\"" },
    empty_cause   = { "[[rule]]\nkind = \"failure_cause\"" },
    unknown_field = { "crontab = \"* * * * *\"" },
    bad_toml      = { "cron = " },
)]
fn rejects_invalid_documents(input: &str) {
    assert!(parse_config(input).is_err());
}

#[test]
fn malformed_cron_is_kept_but_inert() {
    let config = parse_config("cron = \"whenever\"\nactive = true").unwrap();
    assert_eq!(config.cron_expression.as_deref(), Some("whenever"));
    assert!(config.global_cron().is_none());
}

#[test]
fn load_config_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.rules.len(), 3);
}

#[test]
fn load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
