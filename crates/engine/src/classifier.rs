// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure classification: which rules match a job's latest build.

use crate::error::ClassificationError;
use rn_adapters::{ChangeDetector, HostAdapter};
use rn_core::BuildSnapshot;
use rn_rules::{Evidence, GlobalSchedule, TriggerRule};

/// Rules matching one build, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Classification<'r> {
    /// False when the build was never a candidate (healthy result)
    pub candidate: bool,
    pub matches: Vec<&'r TriggerRule>,
}

impl<'r> Classification<'r> {
    fn not_candidate() -> Self {
        Self { candidate: false, matches: Vec::new() }
    }

    /// The first match, which selects the restart action.
    pub fn selected(&self) -> Option<&'r TriggerRule> {
        self.matches.first().copied()
    }

    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.matches.iter().map(|r| r.description.clone()).collect()
    }
}

/// Evaluates builds against rules, gathering only the evidence they need.
pub struct Classifier<'a, H, D> {
    host: &'a H,
    detector: &'a D,
    include_unstable: bool,
    restart_unchanged: bool,
}

impl<'a, H, D> Classifier<'a, H, D>
where
    H: HostAdapter,
    D: ChangeDetector,
{
    pub fn new(host: &'a H, detector: &'a D, schedule: &GlobalSchedule) -> Self {
        Self {
            host,
            detector,
            include_unstable: schedule.include_unstable,
            restart_unchanged: schedule.restart_unchanged_jobs_enabled,
        }
    }

    /// Classify `build` against `rules`.
    ///
    /// The console log is read at most once, and only when a regex rule is
    /// among `rules`. Healthy builds are never read or matched.
    pub async fn classify<'r>(
        &self,
        build: &BuildSnapshot,
        rules: &[&'r TriggerRule],
    ) -> Result<Classification<'r>, ClassificationError> {
        if !build.result.is_unhealthy(self.include_unstable) {
            return Ok(Classification::not_candidate());
        }

        let rules: Vec<&'r TriggerRule> = rules
            .iter()
            .copied()
            .filter(|r| self.restart_unchanged || !r.is_no_change())
            .collect();

        let console = if rules.iter().any(|r| r.needs_console()) {
            let text = self
                .host
                .console_log(build)
                .await
                .map_err(ClassificationError::LogUnavailable)?;
            Some(text)
        } else {
            None
        };

        let unchanged = if rules.iter().any(|r| r.is_no_change()) {
            build.previous().map(|previous| self.detector.is_unchanged(build, previous))
        } else {
            None
        };

        let evidence = Evidence { console: console.as_deref(), unchanged };
        let matches = rules.into_iter().filter(|r| r.matches(build, &evidence)).collect();
        Ok(Classification { candidate: true, matches })
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
