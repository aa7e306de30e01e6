// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build snapshots as reported by the host orchestrator.

use crate::id::JobName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Terminal result of a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
}

impl BuildResult {
    /// Whether a build with this result is a restart candidate at all.
    ///
    /// Only failed builds qualify, plus unstable ones when enabled.
    pub fn is_unhealthy(self, include_unstable: bool) -> bool {
        match self {
            BuildResult::Failure => true,
            BuildResult::Unstable => include_unstable,
            BuildResult::Success | BuildResult::Aborted | BuildResult::NotBuilt => false,
        }
    }
}

crate::simple_display! {
    BuildResult {
        Success => "SUCCESS",
        Failure => "FAILURE",
        Unstable => "UNSTABLE",
        Aborted => "ABORTED",
        NotBuilt => "NOT_BUILT",
    }
}

/// Handle for lazy access to a build's console log.
///
/// The supervisor never reads the log itself; the host adapter resolves
/// the handle when a regex rule needs the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRef {
    /// Log file on disk, relative paths resolved by the host adapter
    Path(PathBuf),
    /// Log text carried in the snapshot itself
    Inline(String),
}

impl Default for LogRef {
    fn default() -> Self {
        LogRef::Inline(String::new())
    }
}

/// Read-only view of a job's latest completed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub job: JobName,
    pub number: u64,
    pub result: BuildResult,
    #[serde(default)]
    pub log: LogRef,
    /// Failure cause identifiers assigned by the host's failure analyzer
    #[serde(default)]
    pub failure_causes: BTreeSet<String>,
    /// Change log entries recorded for this build
    #[serde(default)]
    pub changeset: Vec<String>,
    /// Node the build last ran on (None = controller or unknown)
    #[serde(default)]
    pub node: Option<String>,
    /// Consecutive builds, ending at this one, started by a reincarnation restart
    #[serde(default)]
    pub restart_depth: u32,
    pub timestamp: DateTime<Utc>,
    /// Immediately preceding build of the same job
    #[serde(default)]
    pub previous: Option<Box<BuildSnapshot>>,
}

impl BuildSnapshot {
    pub fn previous(&self) -> Option<&BuildSnapshot> {
        self.previous.as_deref()
    }

    pub fn has_failure_cause(&self, id: &str) -> bool {
        self.failure_causes.contains(id)
    }
}

crate::builder! {
    pub struct BuildSnapshotBuilder => BuildSnapshot {
        into {
            job: JobName = "test_job",
            log: LogRef = LogRef::Inline(String::new()),
        }
        set {
            number: u64 = 1,
            result: BuildResult = BuildResult::Failure,
            failure_causes: BTreeSet<String> = BTreeSet::new(),
            changeset: Vec<String> = Vec::new(),
            restart_depth: u32 = 0,
            timestamp: DateTime<Utc> = DateTime::from_timestamp(1_767_600_000, 0).unwrap_or_default(),
        }
        option {
            node: String = None,
            previous: Box<BuildSnapshot> = None,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl BuildSnapshotBuilder {
    /// Set inline console log text.
    pub fn console(self, text: &str) -> Self {
        self.log(LogRef::Inline(text.to_string()))
    }

    /// Add a single failure cause identifier.
    pub fn cause(mut self, id: &str) -> Self {
        self.failure_causes.insert(id.to_string());
        self
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
