//! Shared helpers for CLI specs.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

pub const BIN: &str = "terraform-provider-podman";

/// Provider command with engine-related environment cleared.
pub fn cli() -> CliBuilder {
    let mut cmd = Command::cargo_bin(BIN).expect("provider binary is built");
    for var in ["TF_PODMAN_SOCKET", "XDG_RUNTIME_DIR", "DOCKER_REGISTRY_USER", "DOCKER_REGISTRY_PASS", "TF_LOG"] {
        cmd.env_remove(var);
    }
    CliBuilder { cmd }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().expect("command runs");
        assert!(output.status.success(), "expected success, got {:?}\n{}", output.status, describe(&output));
        RunAssert { output }
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().expect("command runs");
        assert!(!output.status.success(), "expected failure\n{}", describe(&output));
        RunAssert { output }
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

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).expect("stdout is JSON")
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout lacks {needle:?}\n{}", describe(&self.output));
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout().contains(needle), "stdout has {needle:?}\n{}", describe(&self.output));
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr lacks {needle:?}\n{}", describe(&self.output));
        self
    }
}

fn describe(output: &Output) -> String {
    format!(
        "--- stdout ---\n{}\n--- stderr ---\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Temporary directory holding `.tf` files.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn provider(&self, command: &str, rel: &str) -> CliBuilder {
        cli().arg(command).arg(self.path().join(rel))
    }
}
