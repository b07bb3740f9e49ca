// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A frame on the plugin boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub id: u64,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(id: u64, body: T) -> Self {
        Self { id, body }
    }

    /// A reply carrying the same id.
    pub fn reply<U>(&self, body: U) -> Envelope<U> {
        Envelope { id: self.id, body }
    }
}

/// Request from the plugin host to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Provider and resource schemas
    GetSchema,

    ValidateProviderConfig {
        config: Value,
    },

    /// Store provider-level settings (registry credentials) for later operations
    ConfigureProvider {
        config: Value,
    },

    ValidateResourceConfig {
        type_name: String,
        config: Value,
    },

    /// Fill defaults and report which attributes force replacement
    PlanResourceChange {
        type_name: String,
        #[serde(default)]
        prior_state: Option<Value>,
        #[serde(default)]
        proposed_new_state: Option<Value>,
    },

    /// Create when there is no prior state, delete when there is no planned
    /// state, update otherwise
    ApplyResourceChange {
        type_name: String,
        #[serde(default)]
        prior_state: Option<Value>,
        #[serde(default)]
        planned_state: Option<Value>,
    },

    /// Refresh state from the engine
    ReadResource {
        type_name: String,
        current_state: Value,
    },

    /// Cancel every in-flight operation
    StopProvider,
}

impl Request {
    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetSchema => "get_schema",
            Request::ValidateProviderConfig { .. } => "validate_provider_config",
            Request::ConfigureProvider { .. } => "configure_provider",
            Request::ValidateResourceConfig { .. } => "validate_resource_config",
            Request::PlanResourceChange { .. } => "plan_resource_change",
            Request::ApplyResourceChange { .. } => "apply_resource_change",
            Request::ReadResource { .. } => "read_resource",
            Request::StopProvider => "stop_provider",
        }
    }
}
