// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change detection between consecutive builds.

use rn_core::BuildSnapshot;

/// Decides whether anything meaningful changed between two builds of a job
pub trait ChangeDetector: Send + Sync + 'static {
    fn is_unchanged(&self, build: &BuildSnapshot, previous: &BuildSnapshot) -> bool;
}

/// Compares change logs: two builds with identical change logs are unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangelogDetector;

impl ChangeDetector for ChangelogDetector {
    fn is_unchanged(&self, build: &BuildSnapshot, previous: &BuildSnapshot) -> bool {
        build.changeset == previous.changeset
    }
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
