// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{BuildResult, BuildSnapshot};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for build snapshot types.
pub mod strategies {
    use crate::BuildResult;
    use proptest::prelude::*;

    pub fn arb_build_result() -> impl Strategy<Value = BuildResult> {
        prop_oneof![
            Just(BuildResult::Success),
            Just(BuildResult::Failure),
            Just(BuildResult::Unstable),
            Just(BuildResult::Aborted),
            Just(BuildResult::NotBuilt),
        ]
    }

    pub fn arb_changeset() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-f0-9]{7}", 0..3)
    }
}

// ── Snapshot factory functions ─────────────────────────────────────────────

/// Latest build of `job` failed with the given console text.
pub fn failed_build(job: &str, console: &str) -> BuildSnapshot {
    BuildSnapshot::builder().job(job).result(BuildResult::Failure).console(console).build()
}

/// Two consecutive builds of `job`; the latest carries `previous`.
pub fn build_pair(
    job: &str,
    previous: BuildResult,
    latest: BuildResult,
    changes: (&[&str], &[&str]),
) -> BuildSnapshot {
    let to_vec = |c: &[&str]| c.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let prev = BuildSnapshot::builder()
        .job(job)
        .number(1)
        .result(previous)
        .changeset(to_vec(changes.0))
        .build();
    BuildSnapshot::builder()
        .job(job)
        .number(2)
        .result(latest)
        .changeset(to_vec(changes.1))
        .previous(prev)
        .build()
}
