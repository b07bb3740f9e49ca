// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `podman_container` resource.
//!
//! Create takes a container from absent to present in one transition:
//! translate, connect, pull, create + start + wait for running, then
//! optionally wait for exit and capture logs. The container id is the only
//! engine state written back; it is present in the returned state exactly
//! when a container exists.

use super::{container_schema, Applied, Planned, Resource, ResourceCtx};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;
use tfpod_adapters::{ContainerEngine, EngineConnector, EngineError, Step};
use tfpod_core::{
    auth_for_image, has_errors, AttrPath, ContainerAttributes, ContainerSpec, DecodeError,
    Diagnostic, Schema, SpecError, ValidationError,
};
use thiserror::Error;
use tracing::Instrument;

/// Attributes the engine fills in; never user-set.
const OUTPUTS: [&str; 2] = ["id", "container_logs"];

#[derive(Debug, Error)]
enum LifecycleError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("{0}")]
    Connect(EngineError),

    #[error("Unable to create container with image {image}: {source}")]
    Pull { image: String, source: EngineError },

    #[error("Unable to create container: {0}")]
    Create(EngineError),

    #[error("Unable to start container: {0}")]
    Start(EngineError),

    #[error("Unable to wait container end of execution: {0}")]
    Attach(EngineError),

    #[error("Unable to read container logs: {0}")]
    Logs(EngineError),

    #[error("Unable to inspect container {id}: {source}")]
    Inspect { id: String, source: EngineError },

    #[error("Unable to remove container {id}: {source}")]
    Remove { id: String, source: EngineError },
}

impl LifecycleError {
    /// Split create failures by the sub-step that failed.
    fn from_create(error: EngineError) -> Self {
        let start_phase = matches!(
            error,
            EngineError::Start(_)
                | EngineError::Wait(_)
                | EngineError::Timeout { step: Step::Start | Step::WaitRunning, .. }
                | EngineError::Cancelled { step: Step::Start | Step::WaitRunning }
        );
        if start_phase {
            LifecycleError::Start(error)
        } else {
            LifecycleError::Create(error)
        }
    }

    fn diagnostic(&self) -> Diagnostic {
        match self {
            LifecycleError::Spec(e) => spec_diagnostic(e),
            other => Diagnostic::error(other.to_string()),
        }
    }
}

/// Translation failures point at the attribute they came from.
fn spec_diagnostic(error: &SpecError) -> Diagnostic {
    let attribute = match error.validation() {
        Some(ValidationError::VolumeBothSources | ValidationError::VolumeNoSource) => Some("volumes"),
        Some(ValidationError::EmptyCommandArg) => Some("command"),
        Some(ValidationError::MalformedEnv(_)) => Some("env"),
        Some(ValidationError::InvalidDnsServer(_)) => Some("dns"),
        Some(ValidationError::InvalidHealthcheck { .. }) => Some("healthcheck"),
        Some(ValidationError::Negative { field } | ValidationError::OutOfRange { field }) => {
            field.split('.').next()
        }
        Some(ValidationError::NotAString { .. }) | None => None,
    };
    let diagnostic = Diagnostic::error(error.to_string());
    match attribute {
        Some(name) => diagnostic.at(AttrPath::attr(name)),
        None => diagnostic,
    }
}

fn container_id(state: &Value) -> Option<String> {
    state.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()).map(str::to_string)
}

fn set(state: &mut Value, key: &str, value: impl Into<Value>) {
    if let Some(obj) = state.as_object_mut() {
        obj.insert(key.to_string(), value.into());
    }
}

fn strip_outputs(mut config: Value) -> Value {
    if let Some(obj) = config.as_object_mut() {
        for key in OUTPUTS {
            obj.remove(key);
        }
    }
    config
}

fn log_outcome(operation: &str, start: Instant, applied: &Applied) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match applied.diagnostics.iter().find(|d| d.is_error()) {
        None => tracing::info!(elapsed_ms, "{operation} completed"),
        Some(d) => tracing::error!(elapsed_ms, error = %d.summary, "{operation} failed"),
    }
}

pub struct ContainerResource<C> {
    connector: C,
    schema: Schema,
}

impl<C: EngineConnector> ContainerResource<C> {
    pub fn new(connector: C) -> Self {
        Self { connector, schema: container_schema() }
    }

    /// Fill defaults and wrap single blocks, as the host would.
    fn normalize(&self, value: &mut Value) {
        self.schema.block.normalize_blocks(value);
        self.schema.block.apply_defaults(value);
    }

    /// Create steps. The id is written into `state` as soon as the engine
    /// reports it, so later failures still persist it.
    async fn run_create(
        &self,
        ctx: &ResourceCtx,
        state: &mut Value,
    ) -> Result<(), LifecycleError> {
        let attrs = ContainerAttributes::decode(strip_outputs(state.clone()))?;
        // Translate before connecting so malformed attributes never reach the engine.
        let spec = ContainerSpec::from_attributes(&attrs)?;

        let engine = self.connector.connect(&ctx.op).await.map_err(LifecycleError::Connect)?;

        let auth = auth_for_image(&ctx.config.registry_auth, &attrs.image);
        tracing::info!(image = %attrs.image, authenticated = auth.is_some(), "pulling image");
        engine.pull_image(&ctx.op, &attrs.image, auth).await.map_err(|source| {
            LifecycleError::Pull { image: attrs.image.clone(), source }
        })?;

        let id = engine.create_container(&ctx.op, spec).await.map_err(LifecycleError::from_create)?;
        tracing::info!(container_id = %id, name = %attrs.name, "container running");
        set(state, "id", id.clone());

        if attrs.attach {
            let exit_code = engine.wait_exit(&ctx.op, &id).await.map_err(LifecycleError::Attach)?;
            tracing::info!(container_id = %id, exit_code, "attached container exited");
            if attrs.logs {
                let logs = engine.logs(&ctx.op, &id).await.map_err(LifecycleError::Logs)?;
                tracing::debug!(container_id = %id, bytes = logs.len(), "captured container logs");
                set(state, "container_logs", logs);
            }
        }
        Ok(())
    }

    async fn run_delete(&self, ctx: &ResourceCtx, id: &str) -> Result<(), LifecycleError> {
        let engine = self.connector.connect(&ctx.op).await.map_err(LifecycleError::Connect)?;

        match engine.stop_container(&ctx.op, id).await {
            Ok(()) => tracing::info!(container_id = %id, "container stopped"),
            Err(EngineError::NotFound(_)) => {
                tracing::debug!(container_id = %id, "container already gone before stop")
            }
            Err(e) => tracing::warn!(container_id = %id, error = %e, "stop failed, removing anyway"),
        }

        engine
            .remove_container(&ctx.op, id)
            .await
            .map_err(|source| LifecycleError::Remove { id: id.to_string(), source })?;
        tracing::info!(container_id = %id, "container removed");
        Ok(())
    }

    async fn run_read(&self, ctx: &ResourceCtx, id: &str) -> Result<bool, LifecycleError> {
        let engine = self.connector.connect(&ctx.op).await.map_err(LifecycleError::Connect)?;
        let status = engine
            .inspect(&ctx.op, id)
            .await
            .map_err(|source| LifecycleError::Inspect { id: id.to_string(), source })?;
        match status {
            Some(status) => {
                tracing::debug!(container_id = %id, status = %status.status, running = status.running, "container found");
                Ok(true)
            }
            None => {
                tracing::warn!(container_id = %id, "container no longer exists, dropping from state");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl<C: EngineConnector> Resource for ContainerResource<C> {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut config = config.clone();
        self.normalize(&mut config);

        let mut diagnostics = self.schema.block.validate(&config);
        if has_errors(&diagnostics) {
            return diagnostics;
        }
        if let Err(e) = ContainerSpec::from_value(config) {
            diagnostics.push(LifecycleError::from(e).diagnostic());
        }
        diagnostics
    }

    fn plan(&self, prior: Option<&Value>, proposed: Option<Value>) -> Planned {
        let Some(mut planned) = proposed else {
            return Planned::default();
        };
        self.normalize(&mut planned);

        let diagnostics = self.validate(&strip_outputs(planned.clone()));
        if has_errors(&diagnostics) {
            return Planned { planned_state: None, requires_replace: Vec::new(), diagnostics };
        }

        let requires_replace =
            prior.map(|prior| self.schema.block.requires_replace(prior, &planned)).unwrap_or_default();
        for key in OUTPUTS {
            let carried = match prior {
                Some(prior) if requires_replace.is_empty() => {
                    prior.get(key).cloned().unwrap_or(Value::Null)
                }
                _ => Value::Null,
            };
            set(&mut planned, key, carried);
        }
        Planned { planned_state: Some(planned), requires_replace, diagnostics }
    }

    async fn create(&self, ctx: &ResourceCtx, planned: Value) -> Applied {
        let span = tracing::info_span!("podman_container.create");
        let start = Instant::now();
        let applied = async {
            let mut state = planned;
            match self.run_create(ctx, &mut state).await {
                Ok(()) => Applied::state(state),
                Err(e) => {
                    let persisted = container_id(&state).is_some().then_some(state);
                    Applied::failed(persisted, e.diagnostic())
                }
            }
        }
        .instrument(span.clone())
        .await;
        span.in_scope(|| log_outcome("create", start, &applied));
        applied
    }

    async fn read(&self, ctx: &ResourceCtx, current: Value) -> Applied {
        let Some(id) = container_id(&current) else {
            tracing::warn!("state has no container id, dropping it");
            return Applied::gone();
        };
        let span = tracing::info_span!("podman_container.read", container_id = %id);
        match self.run_read(ctx, &id).instrument(span).await {
            Ok(true) => Applied::state(current),
            Ok(false) => Applied::gone(),
            Err(e) => Applied::failed(Some(current), e.diagnostic()),
        }
    }

    async fn update(&self, _ctx: &ResourceCtx, prior: Value, mut planned: Value) -> Applied {
        for key in OUTPUTS {
            if planned.get(key).map_or(true, Value::is_null) {
                set(&mut planned, key, prior.get(key).cloned().unwrap_or(Value::Null));
            }
        }
        tracing::warn!(
            container_id = container_id(&prior).as_deref().unwrap_or(""),
            "in-place update does not reach the engine; storing planned attributes"
        );
        Applied::state(planned)
    }

    async fn delete(&self, ctx: &ResourceCtx, prior: Value) -> Applied {
        let Some(id) = container_id(&prior) else {
            return Applied::gone();
        };
        let span = tracing::info_span!("podman_container.delete", container_id = %id);
        let start = Instant::now();
        let applied = match self.run_delete(ctx, &id).instrument(span.clone()).await {
            Ok(()) => Applied::gone(),
            Err(e) => Applied::failed(Some(prior), e.diagnostic()),
        };
        span.in_scope(|| log_outcome("delete", start, &applied));
        applied
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
