// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger rules: one matching criterion plus its schedule and actions.

use crate::cron::CronExpr;
use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use rn_core::{BuildResult, BuildSnapshot, RestartTarget};

/// What a rule looks for in a failed build.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Pattern searched for anywhere in the console log
    Regex(Regex),
    /// Failure cause identifier assigned by the host
    FailureCause(String),
    /// Failed the same way as the previous build with nothing changed
    NoChange,
}

impl RuleKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::Regex(_) => "regex",
            RuleKind::FailureCause(_) => "failure_cause",
            RuleKind::NoChange => "no_change",
        }
    }
}

/// Facts about a build gathered by the classifier before rules are checked.
///
/// Each piece is only collected when some active rule needs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evidence<'a> {
    /// Console log text, present when a regex rule is active
    pub console: Option<&'a str>,
    /// Change detector verdict against the previous build, present when a
    /// no-change rule is active and a previous build exists
    pub unchanged: Option<bool>,
}

/// A configured restart criterion.
#[derive(Debug, Clone)]
pub struct TriggerRule {
    pub kind: RuleKind,
    /// Regex pattern or failure cause id; empty for no-change rules
    pub value: String,
    pub description: String,
    /// Cron expression overriding the global schedule for this rule
    pub cron_override: Option<String>,
    /// Script run on the node of the failed build before restarting
    pub node_action: Option<String>,
    /// Script run on the controller before restarting
    pub master_action: Option<String>,
}

impl TriggerRule {
    /// Regex rule. Malformed patterns are rejected here, never at match time.
    ///
    /// Multi-line mode is on so `^` and `$` anchor to log lines.
    pub fn regex(pattern: impl Into<String>) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ConfigError::EmptyValue { kind: "regex" });
        }
        let compiled = RegexBuilder::new(&pattern).multi_line(true).build().map_err(|source| {
            ConfigError::InvalidRegex { pattern: pattern.clone(), source: Box::new(source) }
        })?;
        Ok(Self::with_kind(RuleKind::Regex(compiled), pattern))
    }

    pub fn failure_cause(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyValue { kind: "failure_cause" });
        }
        Ok(Self::with_kind(RuleKind::FailureCause(id.clone()), id))
    }

    pub fn no_change() -> Self {
        let mut rule = Self::with_kind(RuleKind::NoChange, String::new());
        rule.description = "unchanged failure".to_string();
        rule
    }

    fn with_kind(kind: RuleKind, value: String) -> Self {
        Self {
            kind,
            description: value.clone(),
            value,
            cron_override: None,
            node_action: None,
            master_action: None,
        }
    }

    rn_core::setters! {
        into { description: String }
        option {
            cron_override: String,
            node_action: String,
            master_action: String,
        }
    }

    pub fn is_no_change(&self) -> bool {
        matches!(self.kind, RuleKind::NoChange)
    }

    pub fn needs_console(&self) -> bool {
        matches!(self.kind, RuleKind::Regex(_))
    }

    /// Checks whether `now` is a fire instant for this rule.
    ///
    /// Uses the rule's own cron override when it is set and parses; falls
    /// back to `global_cron` otherwise. Returns false when neither is usable.
    pub fn is_time_to_restart(&self, now: DateTime<Utc>, global_cron: Option<&str>) -> bool {
        if let Some(own) = self.own_cron() {
            return own.is_fire_instant(now);
        }
        match global_cron.map(CronExpr::parse) {
            Some(Ok(global)) => global.is_fire_instant(now),
            Some(Err(e)) => {
                tracing::debug!(error = %e, "global cron could not be parsed");
                false
            }
            None => false,
        }
    }

    /// The rule's private schedule, if it has a usable one.
    pub fn own_cron(&self) -> Option<CronExpr> {
        let expr = self.cron_override.as_deref()?;
        match CronExpr::parse(expr) {
            Ok(cron) => Some(cron),
            Err(e) => {
                tracing::debug!(
                    rule = %self.description,
                    error = %e,
                    "rule cron could not be parsed, using global instead"
                );
                None
            }
        }
    }

    /// Check this rule against a build, given the evidence gathered for it.
    pub fn matches(&self, build: &BuildSnapshot, evidence: &Evidence<'_>) -> bool {
        match &self.kind {
            RuleKind::Regex(re) => evidence.console.is_some_and(|log| re.is_match(log)),
            RuleKind::FailureCause(id) => build.has_failure_cause(id),
            RuleKind::NoChange => {
                build.result == BuildResult::Failure
                    && build.previous().is_some_and(|p| p.result == BuildResult::Failure)
                    && evidence.unchanged == Some(true)
            }
        }
    }

    /// Where and how the restart for a build matched by this rule runs.
    pub fn restart_action(&self, build: &BuildSnapshot) -> (RestartTarget, Option<String>) {
        if let Some(script) = &self.node_action {
            (RestartTarget::Node(build.node.clone()), Some(script.clone()))
        } else if let Some(script) = &self.master_action {
            (RestartTarget::Controller, Some(script.clone()))
        } else {
            (RestartTarget::Schedule, None)
        }
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
