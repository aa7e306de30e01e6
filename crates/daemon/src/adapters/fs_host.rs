// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system bridge to the build host.
//!
//! ```text
//! <state>/jobs/<job>.json       latest build snapshot per job
//! <state>/logs/...              console logs referenced by path
//! <state>/restarts/<id>.json    restart requests written here
//! <state>/completed/<job>       completion markers written by the host
//! ```

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rn_adapters::{HostAdapter, HostError};
use rn_core::{BuildSnapshot, Clock, JobName, LogRef, RestartHandle, RestartRequest, SystemClock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Restart request as persisted under `restarts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartRecord {
    pub requested_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: RestartRequest,
}

/// Host adapter backed by a state directory.
#[derive(Clone)]
pub struct FsHost<C: Clock = SystemClock> {
    root: Arc<PathBuf>,
    clock: C,
}

impl FsHost<SystemClock> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, SystemClock)
    }
}

impl<C: Clock> FsHost<C> {
    pub fn with_clock(root: impl Into<PathBuf>, clock: C) -> Self {
        Self { root: Arc::new(root.into()), clock }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.root.join("jobs")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn restarts_dir(&self) -> PathBuf {
        self.root.join("restarts")
    }

    pub fn completed_dir(&self) -> PathBuf {
        self.root.join("completed")
    }

    /// Create the directory layout if missing.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [self.jobs_dir(), self.logs_dir(), self.restarts_dir(), self.completed_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Restart requests not yet answered by a completion, oldest first.
    pub async fn pending_restarts(&self) -> Result<Vec<RestartRecord>, HostError> {
        let mut records = Vec::new();
        for path in json_files(&self.restarts_dir()).await? {
            let text = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<RestartRecord>(&text) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring unreadable restart record"),
            }
        }
        records.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(records)
    }

    /// Consume completion markers, deleting each marker and the job's
    /// outstanding restart records. Returns the completed jobs, sorted.
    pub async fn take_completions(&self) -> Result<Vec<JobName>, HostError> {
        let mut jobs = Vec::new();
        let mut dir = match tokio::fs::read_dir(self.completed_dir()).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(jobs),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            tokio::fs::remove_file(entry.path()).await?;
            jobs.push(JobName::new(name));
        }
        jobs.sort();
        jobs.dedup();

        if !jobs.is_empty() {
            for record in self.pending_restarts().await? {
                if jobs.contains(&record.request.job) {
                    let path = self.record_path(&record.request);
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        debug!(path = %path.display(), error = %e, "restart record already gone");
                    }
                }
            }
        }
        Ok(jobs)
    }

    fn record_path(&self, request: &RestartRequest) -> PathBuf {
        self.restarts_dir().join(format!("{}.json", request.id))
    }

    fn job_path(&self, job: &str) -> PathBuf {
        self.jobs_dir().join(format!("{job}.json"))
    }

    /// Relative log paths are resolved against the state directory.
    fn resolve_log(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl<C: Clock> HostAdapter for FsHost<C> {
    async fn list_candidate_jobs(&self) -> Result<Vec<BuildSnapshot>, HostError> {
        let mut builds = Vec::new();
        for path in json_files(&self.jobs_dir()).await? {
            let text = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<BuildSnapshot>(&text) {
                // Restarts are addressed by file name, so the two must agree
                Ok(build) if path.file_stem() != Some(OsStr::new(build.job.as_str())) => {
                    warn!(path = %path.display(), job = %build.job, "skipping snapshot named for another job")
                }
                Ok(build) => builds.push(build),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping undecodable build snapshot")
                }
            }
        }
        builds.sort_by(|a, b| a.job.cmp(&b.job));
        Ok(builds)
    }

    async fn console_log(&self, build: &BuildSnapshot) -> Result<String, HostError> {
        match &build.log {
            LogRef::Inline(text) => Ok(text.clone()),
            LogRef::Path(path) => {
                let path = self.resolve_log(path);
                match tokio::fs::read(&path).await {
                    Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        Err(HostError::NotFound(path.display().to_string()))
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn restart_job(&self, request: RestartRequest) -> Result<RestartHandle, HostError> {
        if !tokio::fs::try_exists(self.job_path(&request.job)).await? {
            return Err(HostError::Rejected(format!("job {} no longer exists", request.job)));
        }
        let handle = RestartHandle { id: request.id.clone(), job: request.job.clone() };
        let path = self.record_path(&request);
        let record = RestartRecord { requested_at: self.clock.now(), request };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| HostError::Decode { what: "restart record".to_string(), reason: e.to_string() })?;

        tokio::fs::create_dir_all(self.restarts_dir()).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(job = %handle.job, path = %path.display(), "restart record written");
        Ok(handle)
    }
}

/// `*.json` files directly under `dir`, sorted. A missing directory is empty.
async fn json_files(dir: &Path) -> Result<Vec<PathBuf>, HostError> {
    let mut files = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "fs_host_tests.rs"]
mod tests;
