// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: RN_STATE_DIR > XDG_STATE_HOME/reincarnation >
/// ~/.local/state/reincarnation
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("RN_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("reincarnation"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/reincarnation"))
}

/// Rule file: RN_CONFIG > <state>/config.toml
pub fn config_path(state_dir: &Path) -> PathBuf {
    std::env::var("RN_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| state_dir.join("config.toml"))
}

/// Tick period (default 60s, `RN_TICK_MS`)
pub fn tick_period() -> Duration {
    millis("RN_TICK_MS").unwrap_or(Duration::from_secs(60))
}

/// Per-job classification bound (default 30s, `RN_JOB_TIMEOUT_MS`)
pub fn job_timeout() -> Duration {
    millis("RN_JOB_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}

/// Age at which an unanswered restart is dropped (default 6h,
/// `RN_IN_FLIGHT_TIMEOUT_MS`)
pub fn in_flight_timeout() -> Duration {
    millis("RN_IN_FLIGHT_TIMEOUT_MS").unwrap_or(Duration::from_secs(6 * 60 * 60))
}

/// How often completion markers are collected (default 5s,
/// `RN_COMPLETION_POLL_MS`)
pub fn completion_poll() -> Duration {
    millis("RN_COMPLETION_POLL_MS").unwrap_or(Duration::from_secs(5))
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
