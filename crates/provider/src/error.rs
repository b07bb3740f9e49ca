// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tfpod_core::{Diagnostic, DecodeError};
use thiserror::Error;

/// Process environment cannot locate the engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("XDG_RUNTIME_DIR is not set and TF_PODMAN_SOCKET does not override it")]
    NoRuntimeDir,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown resource type {0:?}")]
    UnknownResource(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid provider configuration: {}", first_summary(.0))]
    InvalidConfig(Vec<Diagnostic>),
}

impl ProviderError {
    /// Diagnostics to hand back to the plugin host.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            ProviderError::InvalidConfig(diags) => diags,
            other => vec![Diagnostic::error(other.to_string())],
        }
    }
}

fn first_summary(diags: &[Diagnostic]) -> &str {
    diags.first().map_or("", |d| d.summary.as_str())
}
