// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider registration and request handling.
//!
//! [`Provider`] answers every plugin request. It owns the resource registry,
//! the decoded provider configuration and the token that `StopProvider`
//! cancels. Each lifecycle operation gets a child of that token.

use crate::error::ProviderError;
use crate::registry::ResourceRegistry;
use crate::resource::{self, Resource, ResourceCtx};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tfpod_adapters::{OpContext, Timeouts};
use tfpod_core::attrs::nullable;
use tfpod_core::error::decode;
use tfpod_core::{has_errors, Attribute, Block, RegistryAuth, Schema};
use tfpod_wire::{Request, Response};
use tokio_util::sync::CancellationToken;

/// Schema of the provider block: optional registry credentials.
pub fn provider_schema() -> Schema {
    let registry_auth = Block::new()
        .attr("address", Attribute::string().required().describe("Address of the registry"))
        .attr(
            "username",
            Attribute::string()
                .optional()
                .env_default("DOCKER_REGISTRY_USER", "")
                .describe("Username for the registry"),
        )
        .attr(
            "password",
            Attribute::string()
                .optional()
                .sensitive()
                .env_default("DOCKER_REGISTRY_PASS", "")
                .describe("Password for the registry"),
        );
    Schema::v0(Block::new().attr("registry_auth", Attribute::set_of_blocks(registry_auth).optional()))
}

/// Provider-level settings, decoded once per `ConfigureProvider`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, deserialize_with = "nullable")]
    pub registry_auth: Vec<RegistryAuth>,
}

impl ProviderConfig {
    /// Fill environment defaults, validate, then decode.
    pub fn from_config(mut raw: Value) -> Result<Self, ProviderError> {
        if raw.is_null() {
            raw = json!({});
        }
        let block = provider_schema().block;
        block.normalize_blocks(&mut raw);
        block.apply_defaults(&mut raw);

        let diags = block.validate(&raw);
        if has_errors(&diags) {
            return Err(ProviderError::InvalidConfig(diags));
        }
        Ok(decode("provider configuration", raw)?)
    }
}

pub struct Provider {
    resources: ResourceRegistry,
    config: RwLock<Arc<ProviderConfig>>,
    timeouts: Timeouts,
    stop: CancellationToken,
}

impl Provider {
    pub fn new(resources: ResourceRegistry, timeouts: Timeouts) -> Self {
        Self {
            resources,
            config: RwLock::new(Arc::new(ProviderConfig::default())),
            timeouts,
            stop: CancellationToken::new(),
        }
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Cancelled by `StopProvider`.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn config(&self) -> Arc<ProviderConfig> {
        Arc::clone(&self.config.read())
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::GetSchema => self.schema(),

            Request::ValidateProviderConfig { config } => {
                let diags = ProviderConfig::from_config(config)
                    .map_or_else(ProviderError::into_diagnostics, |_| Vec::new());
                Response::diagnostics(diags)
            }

            Request::ConfigureProvider { config } => match ProviderConfig::from_config(config) {
                Ok(config) => {
                    tracing::info!(registries = config.registry_auth.len(), "provider configured");
                    *self.config.write() = Arc::new(config);
                    Response::diagnostics(Vec::new())
                }
                Err(e) => Response::diagnostics(e.into_diagnostics()),
            },

            Request::ValidateResourceConfig { type_name, config } => {
                match self.resource(&type_name) {
                    Ok(resource) => Response::diagnostics(resource.validate(&config)),
                    Err(e) => Response::diagnostics(e.into_diagnostics()),
                }
            }

            Request::PlanResourceChange { type_name, prior_state, proposed_new_state } => {
                match self.resource(&type_name) {
                    Ok(resource) => {
                        let planned = resource.plan(prior_state.as_ref(), proposed_new_state);
                        Response::Plan {
                            planned_state: planned.planned_state,
                            requires_replace: planned.requires_replace,
                            diagnostics: planned.diagnostics,
                        }
                    }
                    Err(e) => Response::Plan {
                        planned_state: None,
                        requires_replace: Vec::new(),
                        diagnostics: e.into_diagnostics(),
                    },
                }
            }

            Request::ApplyResourceChange { type_name, prior_state, planned_state } => {
                match self.resource(&type_name) {
                    Ok(resource) => {
                        let applied =
                            resource::apply(resource.as_ref(), &self.ctx(), prior_state, planned_state)
                                .await;
                        Response::Apply { new_state: applied.new_state, diagnostics: applied.diagnostics }
                    }
                    Err(e) => Response::Apply { new_state: prior_state, diagnostics: e.into_diagnostics() },
                }
            }

            Request::ReadResource { type_name, current_state } => match self.resource(&type_name) {
                Ok(resource) => {
                    let applied = resource.read(&self.ctx(), current_state).await;
                    Response::Read { new_state: applied.new_state, diagnostics: applied.diagnostics }
                }
                Err(e) => {
                    Response::Read { new_state: Some(current_state), diagnostics: e.into_diagnostics() }
                }
            },

            Request::StopProvider => {
                tracing::info!("stop requested, cancelling in-flight operations");
                self.stop.cancel();
                Response::Stopped
            }
        }
    }

    /// Provider schema plus one schema per registered resource type.
    pub fn schema(&self) -> Response {
        let provider = serde_json::to_value(provider_schema());
        let resources: Result<BTreeMap<String, Value>, _> = self
            .resources
            .iter()
            .map(|(name, resource)| serde_json::to_value(resource.schema()).map(|s| (name.to_string(), s)))
            .collect();
        match (provider, resources) {
            (Ok(provider), Ok(resources)) => Response::Schema { provider, resources },
            (Err(e), _) | (_, Err(e)) => Response::Error { message: format!("cannot encode schema: {e}") },
        }
    }

    fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, ProviderError> {
        self.resources.get(type_name).ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    fn ctx(&self) -> ResourceCtx {
        ResourceCtx {
            op: OpContext::new(self.timeouts, self.stop.child_token()),
            config: self.config(),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
