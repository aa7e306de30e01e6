// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart coordinator: the periodic tick that finds failed jobs and
//! reincarnates them.

use crate::classifier::Classifier;
use crate::error::{ClassificationError, EngineError, JobError, RestartIssueError};
use crate::registry::{InFlightEntry, InFlightRegistry};
use chrono::{DateTime, TimeDelta, Utc};
use rn_adapters::{ChangeDetector, HostAdapter};
use rn_core::{
    BuildSnapshot, Clock, JobName, RestartCause, RestartId, RestartRequest, RestartTarget,
};
use rn_rules::{GlobalSchedule, ScheduleHandle, TriggerRule};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Restart outcomes are logged at `info` when the schedule asks for it,
/// `debug` otherwise.
macro_rules! outcome {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Coordinator timing
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Interval between ticks, in whole seconds
    pub tick_period: Duration,
    /// Bound on classifying a single job
    pub job_timeout: Duration,
    /// Age after which an unanswered restart is forgotten
    pub in_flight_timeout: TimeDelta,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(60),
            job_timeout: Duration::from_secs(30),
            in_flight_timeout: TimeDelta::hours(6),
        }
    }
}

/// Why a listed job was not restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// Latest build is not a failure
    Healthy,
    NoMatch,
    AlreadyInFlight,
    MaxDepth { depth: u32 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Healthy => f.write_str("healthy"),
            SkipReason::NoMatch => f.write_str("no matching rule"),
            SkipReason::AlreadyInFlight => f.write_str("restart already in flight"),
            SkipReason::MaxDepth { depth } => write!(f, "reincarnation depth {depth} at limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Restarted {
    pub job: JobName,
    /// Selected rule
    pub rule: String,
    /// Every matching rule, selected first
    pub matches: Vec<String>,
    pub target: RestartTarget,
    pub restart: RestartId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub job: JobName,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failed {
    pub job: JobName,
    pub error: String,
}

/// What one tick did, sorted by job name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    pub active: bool,
    /// The global schedule or at least one rule fired
    pub fired: bool,
    /// In-flight entries dropped by the timeout sweep
    pub expired: Vec<JobName>,
    pub restarted: Vec<Restarted>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
    /// Jobs whose classification exceeded the per-job timeout
    pub timed_out: Vec<JobName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,
}

impl TickReport {
    fn new(at: DateTime<Utc>) -> Self {
        Self {
            at,
            active: false,
            fired: false,
            expired: Vec::new(),
            restarted: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            timed_out: Vec::new(),
            listing_error: None,
        }
    }

    pub fn restarted_jobs(&self) -> Vec<&str> {
        self.restarted.iter().map(|r| r.job.as_str()).collect()
    }

    pub fn skip_reason(&self, job: &str) -> Option<SkipReason> {
        self.skipped.iter().find(|s| s.job == job).map(|s| s.reason)
    }

    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Restarted(restarted) => self.restarted.push(restarted),
            JobOutcome::Skipped(job, reason) => self.skipped.push(Skipped { job, reason }),
            JobOutcome::Failed(job, error) => {
                if matches!(error, JobError::Classification(ClassificationError::TimedOut(_))) {
                    self.timed_out.push(job.clone());
                }
                self.failed.push(Failed { job, error: error.to_string() });
            }
        }
    }

    fn sort(&mut self) {
        self.restarted.sort_by(|a, b| a.job.cmp(&b.job));
        self.skipped.sort_by(|a, b| a.job.cmp(&b.job));
        self.failed.sort_by(|a, b| a.job.cmp(&b.job));
        self.timed_out.sort();
    }
}

enum JobOutcome {
    Restarted(Restarted),
    Skipped(JobName, SkipReason),
    Failed(JobName, JobError),
}

/// Rules that fire at one tick instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickPlan {
    pub global_fires: bool,
    /// Indices into `GlobalSchedule::rules`
    pub rules: Vec<usize>,
}

impl TickPlan {
    /// A rule is active when its own predicate fires or the global schedule
    /// does. The global fire is OR'd in because a firing global schedule
    /// restarts every enabled rule, even one whose override is quiet now.
    pub fn for_instant(schedule: &GlobalSchedule, now: DateTime<Utc>) -> Self {
        let global_fires = schedule.is_time_to_restart(now);
        let global_cron = schedule.cron_expression.as_deref();
        let unchanged = schedule.restart_unchanged_jobs_enabled;
        let rules = schedule
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| unchanged || !rule.is_no_change())
            .filter(|(_, rule)| global_fires || rule.is_time_to_restart(now, global_cron))
            .map(|(index, _)| index)
            .collect();
        Self { global_fires, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// First tick boundary strictly after `now`.
///
/// Boundaries are multiples of `period` (at least one second) since the
/// epoch, so a 60s period lands on whole minutes.
pub fn next_tick(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let secs = i64::try_from(period.as_secs().max(1)).unwrap_or(60);
    let next = (now.timestamp().div_euclid(secs) + 1) * secs;
    DateTime::from_timestamp(next, 0).unwrap_or(now)
}

/// Drives the reincarnation loop for one host.
pub struct Coordinator<H, D, C> {
    host: H,
    detector: Arc<D>,
    clock: C,
    schedule: ScheduleHandle,
    registry: Arc<InFlightRegistry>,
    config: CoordinatorConfig,
    tick_lock: tokio::sync::Mutex<()>,
}

impl<H, D, C> Coordinator<H, D, C>
where
    H: HostAdapter,
    D: ChangeDetector,
    C: Clock,
{
    pub fn new(
        host: H,
        detector: D,
        clock: C,
        schedule: ScheduleHandle,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            host,
            detector: Arc::new(detector),
            clock,
            schedule,
            registry: Arc::new(InFlightRegistry::new()),
            config,
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &InFlightRegistry {
        &self.registry
    }

    pub fn schedule(&self) -> &ScheduleHandle {
        &self.schedule
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Run one tick at `now`.
    ///
    /// The configuration is snapshotted once at the start; replacing it
    /// mid-tick affects only later ticks. Concurrent calls are serialized.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let _guard = self.tick_lock.lock().await;
        let schedule = self.schedule.snapshot();
        let mut report = TickReport::new(now);

        if !schedule.active {
            debug!(at = %now, "reincarnation inactive, skipping tick");
            return report;
        }
        report.active = true;

        for entry in self.registry.sweep_expired(now, self.config.in_flight_timeout) {
            warn!(
                job = %entry.job,
                restart = %entry.restart,
                started_at = %entry.started_at,
                "in-flight restart timed out, job eligible again"
            );
            report.expired.push(entry.job);
        }

        let plan = TickPlan::for_instant(&schedule, now);
        if plan.is_empty() {
            debug!(at = %now, "no schedule fires");
            return report;
        }
        report.fired = true;
        debug!(at = %now, global = plan.global_fires, rules = plan.rules.len(), "tick fires");

        let builds = match self.host.list_candidate_jobs().await.map_err(EngineError::from) {
            Ok(builds) => builds,
            Err(e) => {
                error!(at = %now, error = %e, "tick ended without restarts");
                report.listing_error = Some(e.to_string());
                return report;
            }
        };

        let rules = Arc::new(plan.rules);
        let mut units = JoinSet::new();
        for build in builds {
            if self.registry.contains(&build.job) {
                debug!(job = %build.job, "restart already in flight");
                report.skipped.push(Skipped { job: build.job, reason: SkipReason::AlreadyInFlight });
                continue;
            }
            let unit = JobUnit {
                host: self.host.clone(),
                detector: Arc::clone(&self.detector),
                registry: Arc::clone(&self.registry),
                schedule: Arc::clone(&schedule),
                rules: Arc::clone(&rules),
                now,
                timeout: self.config.job_timeout,
            };
            units.spawn(unit.run(build));
        }

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(outcome) => report.record(outcome),
                Err(e) => error!(error = %e, "job evaluation task failed"),
            }
        }
        report.sort();

        outcome!(
            schedule.log_info_enabled,
            at = %now,
            restarted = report.restarted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "tick complete"
        );
        report
    }

    /// The host finished a restart build; the job may be restarted again.
    pub fn on_restart_completed(&self, job: &str) -> bool {
        match self.registry.release(job) {
            Some(entry) => {
                outcome!(
                    self.schedule.snapshot().log_info_enabled,
                    job,
                    restart = %entry.restart,
                    "restart completed"
                );
                true
            }
            None => {
                debug!(job, "completion for job with no restart in flight");
                false
            }
        }
    }

    /// Tick on every period boundary until `shutdown` is cancelled.
    ///
    /// Cancellation is only observed between ticks.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(period = ?self.config.tick_period, "coordinator started");
        let mut last: Option<DateTime<Utc>> = None;
        loop {
            let now = self.clock.now();
            let at = next_tick(last.map_or(now, |last| last.max(now)), self.config.tick_period);
            let wait = (at - now).to_std().unwrap_or_default();
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
            let report = self.tick(at).await;
            if let Some(e) = &report.listing_error {
                debug!(at = %at, error = %e, "tick reported listing failure");
            }
            last = Some(at);
        }
        info!("coordinator stopped");
    }
}

/// Everything one job's evaluation needs, owned so it can run on its own task.
struct JobUnit<H, D> {
    host: H,
    detector: Arc<D>,
    registry: Arc<InFlightRegistry>,
    schedule: Arc<GlobalSchedule>,
    rules: Arc<Vec<usize>>,
    now: DateTime<Utc>,
    timeout: Duration,
}

impl<H, D> JobUnit<H, D>
where
    H: HostAdapter,
    D: ChangeDetector,
{
    async fn run(self, build: BuildSnapshot) -> JobOutcome {
        match self.evaluate(&build).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(job = %build.job, error = %e, "job not restarted this tick");
                JobOutcome::Failed(build.job, e)
            }
        }
    }

    async fn evaluate(&self, build: &BuildSnapshot) -> Result<JobOutcome, JobError> {
        let job = build.job.clone();
        let rules: Vec<&TriggerRule> =
            self.rules.iter().filter_map(|&index| self.schedule.rules.get(index)).collect();

        let classifier = Classifier::new(&self.host, &*self.detector, &self.schedule);
        let classification = tokio::time::timeout(self.timeout, classifier.classify(build, &rules))
            .await
            .map_err(|_| ClassificationError::TimedOut(self.timeout))??;

        if !classification.candidate {
            return Ok(JobOutcome::Skipped(job, SkipReason::Healthy));
        }
        let Some(rule) = classification.selected() else {
            debug!(job = %job, result = %build.result, "no rule matches");
            return Ok(JobOutcome::Skipped(job, SkipReason::NoMatch));
        };

        let max_depth = self.schedule.max_depth;
        if max_depth > 0 && build.restart_depth >= max_depth {
            outcome!(
                self.schedule.log_info_enabled,
                job = %job,
                depth = build.restart_depth,
                max_depth,
                "reincarnation depth limit reached"
            );
            return Ok(JobOutcome::Skipped(job, SkipReason::MaxDepth { depth: build.restart_depth }));
        }

        let id = RestartId::generate();
        let entry = InFlightEntry::pending(job.clone(), self.now, &rule.description, id.clone());
        if !self.registry.try_acquire(entry) {
            return Ok(JobOutcome::Skipped(job, SkipReason::AlreadyInFlight));
        }

        let (target, script) = rule.restart_action(build);
        let request = RestartRequest {
            id,
            job: job.clone(),
            target: target.clone(),
            script,
            cause: RestartCause::for_rule(&rule.description),
        };
        let handle = match self.host.restart_job(request).await {
            Ok(handle) => handle,
            Err(e) => {
                self.registry.release(&job);
                return Err(RestartIssueError::Rejected(e).into());
            }
        };
        self.registry.mark_in_flight(&job);

        outcome!(
            self.schedule.log_info_enabled,
            job = %job,
            build = build.number,
            rule = %rule.description,
            target = %target,
            restart = %handle.id,
            "restart issued"
        );
        Ok(JobOutcome::Restarted(Restarted {
            job,
            rule: rule.description.clone(),
            matches: classification.descriptions(),
            target,
            restart: handle.id,
        }))
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
