// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, run loop, shutdown.

mod startup;
pub use startup::{load_schedule, lock_state_dir, restore_in_flight, run_once, startup};

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use rn_adapters::ChangelogDetector;
use rn_core::SystemClock;
use rn_engine::{Coordinator, CoordinatorConfig};
use rn_rules::ConfigError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::adapters::FsHost;
use crate::env;

/// Coordinator with the daemon's concrete adapters
pub type DaemonCoordinator = Coordinator<FsHost, ChangelogDetector, SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/reincarnation)
    pub state_dir: PathBuf,
    /// Rule file
    pub config_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    pub tick_period: Duration,
    pub job_timeout: Duration,
    pub in_flight_timeout: Duration,
    pub completion_poll: Duration,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::for_state_dir(env::state_dir()?))
    }

    pub fn for_state_dir(state_dir: PathBuf) -> Self {
        Self {
            config_path: env::config_path(&state_dir),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            tick_period: env::tick_period(),
            job_timeout: env::job_timeout(),
            in_flight_timeout: env::in_flight_timeout(),
            completion_poll: env::completion_poll(),
            state_dir,
        }
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            tick_period: self.tick_period,
            job_timeout: self.job_timeout,
            in_flight_timeout: TimeDelta::from_std(self.in_flight_timeout)
                .unwrap_or_else(|_| TimeDelta::hours(6)),
        }
    }
}

/// Running daemon state.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub host: FsHost,
    pub coordinator: Arc<DaemonCoordinator>,
}

impl DaemonState {
    /// Run until `shutdown` is cancelled.
    ///
    /// Ticks, completion polling, and SIGHUP reloads run side by side. An
    /// in-progress tick finishes before the coordinator stops.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), LifecycleError> {
        let reload = spawn_reload_on_hangup(self.config.clone(), Arc::clone(&self.coordinator))?;
        let completions = spawn_completion_poll(
            self.host.clone(),
            Arc::clone(&self.coordinator),
            self.config.completion_poll,
            shutdown.clone(),
        );

        self.coordinator.run(shutdown.clone()).await;

        reload.abort();
        if let Err(e) = completions.await {
            warn!("completion poll ended abnormally: {}", e);
        }
        self.shutdown()
    }

    fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");
        let in_flight = self.coordinator.registry().len();
        if in_flight > 0 {
            info!(in_flight, "restarts still outstanding, recorded under restarts/");
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Replace the schedule whenever the process receives SIGHUP. A rule file
/// that fails to load leaves the current schedule in place.
fn spawn_reload_on_hangup(
    config: Config,
    coordinator: Arc<DaemonCoordinator>,
) -> Result<tokio::task::JoinHandle<()>, LifecycleError> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut hangup = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match load_schedule(&config.config_path) {
                Ok(schedule) => {
                    let rules = schedule.rules.len();
                    coordinator.schedule().replace(schedule);
                    info!(path = %config.config_path.display(), rules, "configuration reloaded");
                }
                Err(e) => error!(error = %e, "reload failed, keeping current configuration"),
            }
        }
    }))
}

fn spawn_completion_poll(
    host: FsHost,
    coordinator: Arc<DaemonCoordinator>,
    period: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            match host.take_completions().await {
                Ok(jobs) => {
                    for job in jobs {
                        coordinator.on_restart_completed(&job);
                    }
                }
                Err(e) => warn!(error = %e, "failed to collect completions"),
            }
        }
    })
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Host error: {0}")]
    Host(#[from] rn_adapters::HostError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
