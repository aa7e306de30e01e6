// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-flight restart bookkeeping: at most one restart per job.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use rn_core::{JobName, RestartId};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Per-job restart state as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartState {
    Idle,
    /// Slot acquired, restart not yet accepted by the host
    PendingRestart,
    /// Host accepted the restart, completion not yet observed
    InFlight,
}

rn_core::simple_display! {
    RestartState {
        Idle => "idle",
        PendingRestart => "pending_restart",
        InFlight => "in_flight",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InFlightEntry {
    pub job: JobName,
    pub started_at: DateTime<Utc>,
    /// Description of the rule that selected the restart
    pub rule: String,
    pub restart: RestartId,
    pub state: RestartState,
}

impl InFlightEntry {
    pub fn pending(
        job: JobName,
        started_at: DateTime<Utc>,
        rule: impl Into<String>,
        restart: RestartId,
    ) -> Self {
        Self { job, started_at, rule: rule.into(), restart, state: RestartState::PendingRestart }
    }
}

/// Jobs with a restart pending or running.
///
/// All operations take a short mutex section and never wait on I/O.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    entries: Mutex<HashMap<JobName, InFlightEntry>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the job's restart slot. Returns false if it is already held.
    pub fn try_acquire(&self, entry: InFlightEntry) -> bool {
        match self.entries.lock().entry(entry.job.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Record that the host accepted the restart.
    pub fn mark_in_flight(&self, job: &str) -> bool {
        match self.entries.lock().get_mut(job) {
            Some(entry) => {
                entry.state = RestartState::InFlight;
                true
            }
            None => false,
        }
    }

    pub fn release(&self, job: &str) -> Option<InFlightEntry> {
        self.entries.lock().remove(job)
    }

    /// Remove entries older than `timeout`, returning them.
    pub fn sweep_expired(&self, now: DateTime<Utc>, timeout: TimeDelta) -> Vec<InFlightEntry> {
        let mut entries = self.entries.lock();
        let expired: Vec<JobName> = entries
            .values()
            .filter(|e| now - e.started_at > timeout)
            .map(|e| e.job.clone())
            .collect();
        let mut removed: Vec<InFlightEntry> =
            expired.iter().filter_map(|job| entries.remove(job)).collect();
        removed.sort_by(|a, b| a.job.cmp(&b.job));
        removed
    }

    pub fn contains(&self, job: &str) -> bool {
        self.entries.lock().contains_key(job)
    }

    pub fn state(&self, job: &str) -> RestartState {
        self.entries.lock().get(job).map(|e| e.state).unwrap_or(RestartState::Idle)
    }

    pub fn get(&self, job: &str) -> Option<InFlightEntry> {
        self.entries.lock().get(job).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// All entries, sorted by job name.
    pub fn entries(&self) -> Vec<InFlightEntry> {
        let mut all: Vec<_> = self.entries.lock().values().cloned().collect();
        all.sort_by(|a, b| a.job.cmp(&b.job));
        all
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
