// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart requests handed to the host, and the handles it returns.

use crate::id::{JobName, RestartId};
use serde::{Deserialize, Serialize};

/// Short description attached to every build started by the supervisor.
pub const RESTART_CAUSE: &str = "PeriodicReincarnation";

/// Where a restart action executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "node", rename_all = "snake_case")]
pub enum RestartTarget {
    /// Run the rule's node script on the node the failed build used, then rebuild
    Node(Option<String>),
    /// Run the rule's controller script, then rebuild
    Controller,
    /// Plain rebuild, no custom script
    Schedule,
}

crate::simple_display! {
    RestartTarget {
        Node(..) => "node",
        Controller => "controller",
        Schedule => "schedule",
    }
}

/// Cause recorded on the restarted build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartCause {
    pub short_description: String,
    /// Description of the rule that selected the restart
    pub rule: String,
}

impl RestartCause {
    pub fn for_rule(rule: impl Into<String>) -> Self {
        Self { short_description: RESTART_CAUSE.to_string(), rule: rule.into() }
    }
}

/// A restart the supervisor asks the host to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartRequest {
    pub id: RestartId,
    pub job: JobName,
    pub target: RestartTarget,
    /// Script body to run before rebuilding (None for `Schedule`)
    pub script: Option<String>,
    pub cause: RestartCause,
}

/// Acknowledgement from the host that a restart was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartHandle {
    pub id: RestartId,
    pub job: JobName,
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
