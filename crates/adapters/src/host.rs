// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use rn_core::{BuildSnapshot, RestartHandle, RestartRequest};
use thiserror::Error;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host unavailable: {0}")]
    Unavailable(String),

    #[error("restart rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

/// Adapter for the build orchestrator the supervisor is attached to
#[async_trait]
pub trait HostAdapter: Clone + Send + Sync + 'static {
    /// Latest completed build of every job, consistent as of the call
    async fn list_candidate_jobs(&self) -> Result<Vec<BuildSnapshot>, HostError>;

    /// Resolve a build's console log text
    async fn console_log(&self, build: &BuildSnapshot) -> Result<String, HostError>;

    /// Ask the host to restart a job; completion is reported separately
    async fn restart_job(&self, request: RestartRequest) -> Result<RestartHandle, HostError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{HostAdapter, HostError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rn_core::{BuildSnapshot, JobName, LogRef, RestartHandle, RestartRequest};
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeHostState {
        jobs: BTreeMap<JobName, BuildSnapshot>,
        failing_logs: HashSet<JobName>,
        slow_logs: HashMap<JobName, Duration>,
        rejected: HashSet<JobName>,
        listing_error: Option<String>,
        restarts: Vec<RestartRequest>,
        log_reads: usize,
    }

    /// Fake host for testing
    #[derive(Clone, Default)]
    pub struct FakeHost {
        inner: Arc<Mutex<FakeHostState>>,
    }

    impl FakeHost {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add or replace a job's latest build
        pub fn set_build(&self, build: BuildSnapshot) {
            self.inner.lock().jobs.insert(build.job.clone(), build);
        }

        pub fn remove_job(&self, job: &str) {
            self.inner.lock().jobs.remove(job);
        }

        /// Make console log reads for `job` fail
        pub fn fail_log(&self, job: &str) {
            self.inner.lock().failing_logs.insert(JobName::new(job));
        }

        /// Make console log reads for `job` take `delay`
        pub fn slow_log(&self, job: &str, delay: Duration) {
            self.inner.lock().slow_logs.insert(JobName::new(job), delay);
        }

        /// Make restart requests for `job` fail
        pub fn reject_restart(&self, job: &str) {
            self.inner.lock().rejected.insert(JobName::new(job));
        }

        /// Make the job listing fail
        pub fn fail_listing(&self, reason: &str) {
            self.inner.lock().listing_error = Some(reason.to_string());
        }

        /// Get all accepted restart requests
        pub fn restarts(&self) -> Vec<RestartRequest> {
            self.inner.lock().restarts.clone()
        }

        /// Jobs with accepted restart requests, in issue order
        pub fn restarted_jobs(&self) -> Vec<String> {
            self.inner.lock().restarts.iter().map(|r| r.job.to_string()).collect()
        }

        /// Number of console log reads performed
        pub fn log_reads(&self) -> usize {
            self.inner.lock().log_reads
        }
    }

    #[async_trait]
    impl HostAdapter for FakeHost {
        async fn list_candidate_jobs(&self) -> Result<Vec<BuildSnapshot>, HostError> {
            let inner = self.inner.lock();
            if let Some(reason) = &inner.listing_error {
                return Err(HostError::Unavailable(reason.clone()));
            }
            Ok(inner.jobs.values().cloned().collect())
        }

        async fn console_log(&self, build: &BuildSnapshot) -> Result<String, HostError> {
            let delay = {
                let mut inner = self.inner.lock();
                inner.log_reads += 1;
                if inner.failing_logs.contains(&build.job) {
                    return Err(HostError::NotFound(format!("log for {}", build.job)));
                }
                inner.slow_logs.get(&build.job).copied()
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match &build.log {
                LogRef::Inline(text) => Ok(text.clone()),
                LogRef::Path(path) => Err(HostError::NotFound(path.display().to_string())),
            }
        }

        async fn restart_job(&self, request: RestartRequest) -> Result<RestartHandle, HostError> {
            let mut inner = self.inner.lock();
            if inner.rejected.contains(&request.job) {
                return Err(HostError::Rejected(format!("{} is disabled", request.job)));
            }
            let handle = RestartHandle { id: request.id.clone(), job: request.job.clone() };
            inner.restarts.push(request);
            Ok(handle)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHost;

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
