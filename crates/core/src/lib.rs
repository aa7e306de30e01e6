// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rn-core: Shared types for the periodic reincarnation supervisor

pub mod macros;

pub mod build;
pub mod clock;
pub mod id;
pub mod restart;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(any(test, feature = "test-support"))]
pub use build::BuildSnapshotBuilder;
pub use build::{BuildResult, BuildSnapshot, LogRef};
pub use clock::{truncate_to_minute, truncate_to_second, Clock, FakeClock, SystemClock};
pub use id::{short, JobName, RestartId};
pub use restart::{RestartCause, RestartHandle, RestartRequest, RestartTarget, RESTART_CAUSE};
