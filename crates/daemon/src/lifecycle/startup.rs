// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use rn_adapters::ChangelogDetector;
use rn_core::{Clock, SystemClock};
use rn_engine::{Coordinator, InFlightEntry, InFlightRegistry, TickReport};
use rn_rules::{GlobalSchedule, ScheduleHandle};
use tracing::{info, warn};

use crate::adapters::FsHost;

use super::{Config, DaemonState, LifecycleError};

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(daemon) => Ok(daemon),
        Err(e) => {
            // A failed lock means the PID file belongs to a running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                let _ = std::fs::remove_file(&config.lock_path);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    let mut lock_file = lock_state_dir(config)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let host = FsHost::new(&config.state_dir);
    host.ensure_layout()?;

    let schedule = load_schedule(&config.config_path)?;
    info!(
        path = %config.config_path.display(),
        active = schedule.active,
        cron = schedule.cron_expression.as_deref().unwrap_or("-"),
        rules = schedule.rules.len(),
        "loaded configuration"
    );

    let coordinator = Arc::new(Coordinator::new(
        host.clone(),
        ChangelogDetector,
        SystemClock,
        ScheduleHandle::new(schedule),
        config.coordinator_config(),
    ));

    let restored = restore_in_flight(&host, coordinator.registry()).await?;
    if restored > 0 {
        info!(restored, "resumed outstanding restarts");
    }

    Ok(DaemonState { config: config.clone(), lock_file, host, coordinator })
}

/// Take the exclusive lock on the state directory, released on drop.
///
/// Completion markers and restart records belong to whoever holds it.
pub fn lock_state_dir(config: &Config) -> Result<File, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating so a running daemon's PID survives a failed lock
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    Ok(lock_file)
}

/// Run a single tick at `at` against a state directory no daemon owns.
///
/// Fails with [`LifecycleError::LockFailed`] before touching any marker or
/// record when a daemon holds the lock.
pub async fn run_once(config: &Config, at: DateTime<Utc>) -> Result<TickReport, LifecycleError> {
    let _lock = lock_state_dir(config)?;

    let schedule = load_schedule(&config.config_path)?;
    let host = FsHost::new(&config.state_dir);
    host.ensure_layout()?;
    let coordinator = Coordinator::new(
        host.clone(),
        ChangelogDetector,
        SystemClock,
        ScheduleHandle::new(schedule),
        config.coordinator_config(),
    );
    restore_in_flight(&host, coordinator.registry()).await?;

    Ok(coordinator.tick(at).await)
}

/// Load the rule file. A missing file yields an inactive schedule.
pub fn load_schedule(path: &Path) -> Result<GlobalSchedule, LifecycleError> {
    if !path.exists() {
        warn!(path = %path.display(), "no configuration file, reincarnation inactive");
        return Ok(GlobalSchedule::default());
    }
    Ok(rn_rules::load_config(path)?)
}

/// Seed `registry` with restarts recorded on disk that the host has not yet
/// completed. Completion markers present now are consumed first.
pub async fn restore_in_flight<C: Clock>(
    host: &FsHost<C>,
    registry: &InFlightRegistry,
) -> Result<usize, LifecycleError> {
    let completed = host.take_completions().await?;
    if !completed.is_empty() {
        info!(jobs = completed.len(), "completions consumed at startup");
    }

    let mut restored = 0;
    for record in host.pending_restarts().await? {
        let job = record.request.job.clone();
        let entry = InFlightEntry::pending(
            job.clone(),
            record.requested_at,
            record.request.cause.rule,
            record.request.id,
        );
        if registry.try_acquire(entry) {
            registry.mark_in_flight(&job);
            restored += 1;
        } else {
            warn!(job = %job, "duplicate restart record, keeping the oldest");
        }
    }
    Ok(restored)
}
