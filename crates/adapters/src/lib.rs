// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rn-adapters: Seams to the host orchestrator

pub mod change;
pub mod host;

pub use change::{ChangeDetector, ChangelogDetector};
pub use host::{HostAdapter, HostError};

#[cfg(any(test, feature = "test-support"))]
pub use host::FakeHost;
