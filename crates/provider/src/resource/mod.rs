// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource types the provider serves.
//!
//! A resource owns its schema and four lifecycle callbacks. The host keeps
//! state between calls; each callback gets the state it needs and returns
//! the state to persist (`None` means the resource no longer exists).

mod container;
mod container_schema;

pub use container::ContainerResource;
pub use container_schema::container_schema;

use crate::provider::ProviderConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tfpod_adapters::OpContext;
use tfpod_core::{AttrPath, Diagnostic, Schema};

/// Everything a lifecycle callback needs besides its state.
#[derive(Debug, Clone, Default)]
pub struct ResourceCtx {
    pub op: OpContext,
    pub config: Arc<ProviderConfig>,
}

/// Result of planning a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planned {
    pub planned_state: Option<Value>,
    pub requires_replace: Vec<AttrPath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a lifecycle callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub new_state: Option<Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Applied {
    pub fn state(new_state: Value) -> Self {
        Self { new_state: Some(new_state), diagnostics: Vec::new() }
    }

    pub fn gone() -> Self {
        Self::default()
    }

    /// Failed operation; `new_state` is whatever must still be persisted.
    pub fn failed(new_state: Option<Value>, diagnostic: Diagnostic) -> Self {
        Self { new_state, diagnostics: vec![diagnostic] }
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> Schema;

    /// Plan-time checks of raw configuration. Never talks to the engine.
    fn validate(&self, config: &Value) -> Vec<Diagnostic>;

    fn plan(&self, prior: Option<&Value>, proposed: Option<Value>) -> Planned;

    async fn create(&self, ctx: &ResourceCtx, planned: Value) -> Applied;

    async fn read(&self, ctx: &ResourceCtx, current: Value) -> Applied;

    async fn update(&self, ctx: &ResourceCtx, prior: Value, planned: Value) -> Applied;

    async fn delete(&self, ctx: &ResourceCtx, prior: Value) -> Applied;
}

/// Route an apply to create, update or delete based on which states exist.
pub async fn apply(
    resource: &dyn Resource,
    ctx: &ResourceCtx,
    prior: Option<Value>,
    planned: Option<Value>,
) -> Applied {
    match (prior, planned) {
        (None, Some(planned)) => resource.create(ctx, planned).await,
        (Some(prior), Some(planned)) => resource.update(ctx, prior, planned).await,
        (Some(prior), None) => resource.delete(ctx, prior).await,
        (None, None) => Applied::gone(),
    }
}
