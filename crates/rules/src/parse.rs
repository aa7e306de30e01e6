// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration loading.
//!
//! ```toml
//! cron = "* * * * *"
//! active = true
//! no_change = true
//!
//! [[rule]]
//! kind = "regex"
//! value = "reg ex one"
//! ```

use crate::cron::CronExpr;
use crate::error::ConfigError;
use crate::rule::TriggerRule;
use crate::schedule::GlobalSchedule;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    cron: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    no_change: bool,
    #[serde(default)]
    log_info: bool,
    #[serde(default)]
    include_unstable: bool,
    #[serde(default)]
    max_depth: u32,
    /// Shorthand: bare regex patterns with no per-rule settings
    #[serde(default)]
    regex: Vec<String>,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDef {
    kind: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cron: Option<String>,
    #[serde(default)]
    node_action: Option<String>,
    #[serde(default)]
    master_action: Option<String>,
}

impl RuleDef {
    fn into_rule(self) -> Result<TriggerRule, ConfigError> {
        let mut rule = match self.kind.as_str() {
            "regex" => TriggerRule::regex(self.value)?,
            "failure_cause" => TriggerRule::failure_cause(self.value)?,
            "no_change" => TriggerRule::no_change(),
            other => return Err(ConfigError::UnknownKind(other.to_string())),
        };
        if let Some(description) = non_blank(self.description) {
            rule.description = description;
        }
        rule.cron_override = non_blank(self.cron);
        rule.node_action = non_blank(self.node_action);
        rule.master_action = non_blank(self.master_action);
        Ok(rule)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse a configuration document into a [`GlobalSchedule`].
///
/// Malformed regexes and empty rule values reject the document. Malformed
/// cron expressions are kept and logged: they never fire at evaluation time.
pub fn parse_config(content: &str) -> Result<GlobalSchedule, ConfigError> {
    let file: ConfigFile = toml::from_str(content)?;

    let mut rules = Vec::with_capacity(file.regex.len() + file.rules.len() + 1);
    for pattern in file.regex {
        let index = rules.len();
        rules.push(TriggerRule::regex(pattern).map_err(|e| indexed(index, e))?);
    }
    for def in file.rules {
        let index = rules.len();
        rules.push(def.into_rule().map_err(|e| indexed(index, e))?);
    }
    if file.no_change && !rules.iter().any(TriggerRule::is_no_change) {
        rules.push(TriggerRule::no_change());
    }

    let cron_expression = non_blank(file.cron);
    warn_unusable_crons(cron_expression.as_deref(), &rules);

    Ok(GlobalSchedule {
        cron_expression,
        active: file.active,
        restart_unchanged_jobs_enabled: file.no_change,
        log_info_enabled: file.log_info,
        include_unstable: file.include_unstable,
        max_depth: file.max_depth,
        rules,
    })
}

/// Read and parse a configuration file.
pub fn load_config(path: &Path) -> Result<GlobalSchedule, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    parse_config(&content)
}

fn indexed(index: usize, source: ConfigError) -> ConfigError {
    ConfigError::Rule { index, source: Box::new(source) }
}

fn warn_unusable_crons(global: Option<&str>, rules: &[TriggerRule]) {
    if let Some(Err(e)) = global.map(CronExpr::parse) {
        tracing::warn!(error = %e, "global cron is unusable; only rule overrides will fire");
    }
    for rule in rules {
        if let Some(Err(e)) = rule.cron_override.as_deref().map(CronExpr::parse) {
            tracing::warn!(
                rule = %rule.description,
                error = %e,
                "rule cron is unusable; falling back to global"
            );
        }
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
