// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide supervisor configuration and its copy-on-read handle.

use crate::cron::CronExpr;
use crate::rule::TriggerRule;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Global schedule and rule set.
///
/// Immutable once built; reconfiguration replaces the whole value through
/// [`ScheduleHandle::replace`].
#[derive(Debug, Clone, Default)]
pub struct GlobalSchedule {
    pub cron_expression: Option<String>,
    pub active: bool,
    pub restart_unchanged_jobs_enabled: bool,
    pub log_info_enabled: bool,
    /// Treat UNSTABLE builds as restart candidates
    pub include_unstable: bool,
    /// Consecutive reincarnations allowed per job (0 = unlimited)
    pub max_depth: u32,
    pub rules: Vec<TriggerRule>,
}

impl GlobalSchedule {
    /// Checks whether `now` is a fire instant of the global cron expression.
    pub fn is_time_to_restart(&self, now: DateTime<Utc>) -> bool {
        self.global_cron().is_some_and(|cron| cron.is_fire_instant(now))
    }

    /// The global recurrence, if configured and parsable.
    pub fn global_cron(&self) -> Option<CronExpr> {
        let expr = self.cron_expression.as_deref()?;
        match CronExpr::parse(expr) {
            Ok(cron) => Some(cron),
            Err(e) => {
                tracing::debug!(error = %e, "global cron could not be parsed");
                None
            }
        }
    }

    /// Rules in declaration order, minus no-change rules when those are disabled.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &TriggerRule> {
        let unchanged = self.restart_unchanged_jobs_enabled;
        self.rules.iter().filter(move |r| unchanged || !r.is_no_change())
    }

    /// Earliest instant after `now` at which the global schedule or any rule fires.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let global = self.global_cron();
        let global_next = global.as_ref().and_then(|c| c.next_after(now));
        self.enabled_rules()
            .filter_map(|r| r.own_cron())
            .filter_map(|c| c.next_after(now))
            .chain(global_next)
            .min()
    }
}

/// Shared handle to the current [`GlobalSchedule`].
///
/// Readers take an `Arc` snapshot and keep it for as long as they need a
/// consistent view; writers swap in a complete replacement.
#[derive(Debug, Clone, Default)]
pub struct ScheduleHandle {
    current: Arc<RwLock<Arc<GlobalSchedule>>>,
}

impl ScheduleHandle {
    pub fn new(schedule: GlobalSchedule) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(schedule))) }
    }

    /// The latest committed configuration.
    pub fn snapshot(&self) -> Arc<GlobalSchedule> {
        Arc::clone(&self.current.read())
    }

    /// Replace the configuration, returning the previous one.
    pub fn replace(&self, schedule: GlobalSchedule) -> Arc<GlobalSchedule> {
        std::mem::replace(&mut *self.current.write(), Arc::new(schedule))
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
