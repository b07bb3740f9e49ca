// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the provider crate.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tfpod_adapters::Timeouts;

/// Default log filter when `TF_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Resolve the engine socket: TF_PODMAN_SOCKET > XDG_RUNTIME_DIR/podman/podman.sock
pub fn socket_path() -> Result<PathBuf, ConfigError> {
    if let Some(socket) = non_empty("TF_PODMAN_SOCKET") {
        return Ok(PathBuf::from(socket));
    }
    let runtime_dir = non_empty("XDG_RUNTIME_DIR").ok_or(ConfigError::NoRuntimeDir)?;
    Ok(PathBuf::from(runtime_dir).join("podman/podman.sock"))
}

/// Per-step deadlines, each overridable in milliseconds.
pub fn timeouts() -> Timeouts {
    let defaults = Timeouts::default();
    defaults
        .connect(millis("TF_PODMAN_CONNECT_TIMEOUT_MS").unwrap_or(defaults.connect))
        .pull(millis("TF_PODMAN_PULL_TIMEOUT_MS").unwrap_or(defaults.pull))
        .start(millis("TF_PODMAN_START_TIMEOUT_MS").unwrap_or(defaults.start))
        .attach(millis("TF_PODMAN_ATTACH_TIMEOUT_MS").unwrap_or(defaults.attach))
        .stop(millis("TF_PODMAN_STOP_TIMEOUT_MS").unwrap_or(defaults.stop))
        .poll(millis("TF_PODMAN_POLL_MS").unwrap_or(defaults.poll))
}

/// Log filter directive (default `info`).
pub fn log_filter() -> String {
    non_empty("TF_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.trim().parse::<u64>().ok()).map(Duration::from_millis)
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
