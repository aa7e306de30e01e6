// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reincarnation daemon library
//!
//! Wires the restart coordinator to a file-system host and drives it from
//! the `reincarnated` binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod env;
pub mod lifecycle;
pub mod logging;

pub use adapters::{FsHost, RestartRecord};
pub use lifecycle::{
    load_schedule, lock_state_dir, restore_in_flight, run_once, startup, Config,
    DaemonCoordinator, DaemonState, LifecycleError,
};
