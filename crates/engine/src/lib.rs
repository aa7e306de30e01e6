// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rn-engine: Classification, in-flight bookkeeping, and the restart tick

pub mod classifier;
pub mod coordinator;
mod error;
pub mod registry;

pub use classifier::{Classification, Classifier};
pub use coordinator::{
    next_tick, Coordinator, CoordinatorConfig, Failed, Restarted, SkipReason, Skipped, TickPlan,
    TickReport,
};
pub use error::{ClassificationError, EngineError, JobError, RestartIssueError};
pub use registry::{InFlightEntry, InFlightRegistry, RestartState};
