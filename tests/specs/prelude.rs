//! Shared helpers for `reincarnated` specs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::OnceLock;

pub use serde_json::{json, Value};

/// Temporary state directory laid out the way the file-system host expects.
pub struct StateDir {
    dir: tempfile::TempDir,
}

impl StateDir {
    pub fn empty() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        for sub in ["jobs", "logs", "restarts", "completed"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the state directory.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn config(&self, toml: &str) -> PathBuf {
        self.file("config.toml", toml)
    }

    /// Record the latest build of `job`.
    pub fn job(&self, job: &str, snapshot: Value) -> PathBuf {
        self.file(&format!("jobs/{job}.json"), &snapshot.to_string())
    }

    /// Restart requests written so far, parsed.
    pub fn restarts(&self) -> Vec<Value> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(self.dir.path().join("restarts"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        paths
            .into_iter()
            .map(|p| serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap())
            .collect()
    }
}

/// Snapshot JSON for a failed build with an inline console log.
pub fn failed_build(job: &str, console: &str) -> Value {
    json!({
        "job": job,
        "number": 12,
        "result": "FAILURE",
        "log": { "inline": console },
        "timestamp": "2026-01-05T08:55:00Z",
    })
}

/// The `reincarnated` binary, built once per test run.
///
/// It belongs to `rn-daemon`, so cargo neither builds it for this package
/// nor sets `CARGO_BIN_EXE_reincarnated`. It lands in the profile directory
/// that holds this test executable's `deps/`.
fn binary() -> &'static Path {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| {
        let exe = std::env::current_exe().unwrap();
        let profile_dir = exe.parent().and_then(Path::parent).unwrap().to_path_buf();

        let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
        let mut build = std::process::Command::new(cargo);
        build
            .current_dir(env!("CARGO_MANIFEST_DIR"))
            .args(["build", "--quiet", "-p", "rn-daemon", "--bin", "reincarnated"]);
        if profile_dir.ends_with("release") {
            build.arg("--release");
        }
        let status = build.status().unwrap();
        assert!(status.success(), "building reincarnated failed");

        let path = profile_dir.join(format!("reincarnated{}", std::env::consts::EXE_SUFFIX));
        assert!(path.exists(), "reincarnated not found at {}", path.display());
        path
    })
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    fn new() -> Self {
        let mut cmd = assert_cmd::Command::new(binary());
        cmd.env_remove("RN_CONFIG").env("RUST_LOG", "warn");
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Point the binary at `state`.
    pub fn state(self, state: &StateDir) -> Self {
        let path = state.path().to_path_buf();
        self.env("RN_STATE_DIR", path)
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(run.output.status.success(), "expected success\n{}", run.describe());
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(!run.output.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}\n{}", self.describe());
        self
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected), "{}", self.describe());
        self
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }

    fn describe(&self) -> String {
        format!("--- stdout\n{}\n--- stderr\n{}", self.stdout(), self.stderr())
    }
}
