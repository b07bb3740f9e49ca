// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tfpod_core::{AttrPath, Diagnostic};

/// Response from the provider to the plugin host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Provider schema plus one schema per resource type
    Schema {
        provider: Value,
        resources: BTreeMap<String, Value>,
    },

    /// Outcome of a validate or configure request
    Diagnostics {
        #[serde(default)]
        diagnostics: Vec<Diagnostic>,
    },

    Plan {
        planned_state: Option<Value>,
        #[serde(default)]
        requires_replace: Vec<AttrPath>,
        #[serde(default)]
        diagnostics: Vec<Diagnostic>,
    },

    /// `new_state: None` means the resource no longer exists
    Apply {
        new_state: Option<Value>,
        #[serde(default)]
        diagnostics: Vec<Diagnostic>,
    },

    Read {
        new_state: Option<Value>,
        #[serde(default)]
        diagnostics: Vec<Diagnostic>,
    },

    Stopped,

    /// Request could not be decoded
    Error { message: String },
}

impl Response {
    pub fn diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Response::Diagnostics { diagnostics }
    }

    /// Diagnostics carried by this response, if any.
    pub fn diags(&self) -> &[Diagnostic] {
        match self {
            Response::Diagnostics { diagnostics }
            | Response::Plan { diagnostics, .. }
            | Response::Apply { diagnostics, .. }
            | Response::Read { diagnostics, .. } => diagnostics,
            Response::Schema { .. } | Response::Stopped | Response::Error { .. } => &[],
        }
    }
}
