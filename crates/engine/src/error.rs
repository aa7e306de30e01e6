// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.
//!
//! Everything here is isolated per job or per tick: errors are logged and
//! reported, never propagated out of a tick.

use rn_adapters::HostError;
use std::time::Duration;
use thiserror::Error;

/// A build could not be classified this tick
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("console log unavailable: {0}")]
    LogUnavailable(#[source] HostError),

    #[error("classification exceeded {0:?}")]
    TimedOut(Duration),
}

/// The host did not accept a restart
#[derive(Debug, Error)]
pub enum RestartIssueError {
    #[error("host rejected restart: {0}")]
    Rejected(#[source] HostError),
}

/// Per-job failure within a tick
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    RestartIssue(#[from] RestartIssueError),
}

/// Tick-level failure: no job was evaluated
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to list candidate jobs: {0}")]
    Host(#[from] HostError),
}
