// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime client facade.
//!
//! One connection per lifecycle operation: an [`EngineConnector`] opens a
//! fresh [`ContainerEngine`] session, the operation drives it, and the
//! session is dropped when the operation ends. Nothing is shared between
//! operations.

use crate::context::{OpContext, Step};
use async_trait::async_trait;
use std::time::Duration;
use tfpod_core::{ContainerSpec, RegistryAuth};
use thiserror::Error;

/// Errors from engine calls. Engine messages are carried verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot connect to the container engine at {socket}: {message}")]
    Connection { socket: String, message: String },
    #[error("{0}")]
    ImagePull(String),
    #[error("{0}")]
    Creation(String),
    #[error("{0}")]
    Start(String),
    #[error("{0}")]
    Wait(String),
    #[error("{0}")]
    Stop(String),
    #[error("{0}")]
    Remove(String),
    #[error("{0}")]
    Inspect(String),
    #[error("{0}")]
    Logs(String),
    #[error("no such container: {0}")]
    NotFound(String),
    #[error("{step} timed out after {after:?}")]
    Timeout { step: Step, after: Duration },
    #[error("{step} cancelled")]
    Cancelled { step: Step },
}

/// What the engine reports about an existing container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub id: String,
    pub running: bool,
    pub status: String,
    pub exit_code: Option<i64>,
}

/// Opens a session to the container engine.
#[async_trait]
pub trait EngineConnector: Clone + Send + Sync + 'static {
    type Engine: ContainerEngine;

    async fn connect(&self, ctx: &OpContext) -> Result<Self::Engine, EngineError>;
}

/// A session with the container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Pull an image; no retry.
    async fn pull_image(
        &self,
        ctx: &OpContext,
        image: &str,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), EngineError>;

    /// Take a container from absent to present: force a terminal on the
    /// spec, create, start, then block until the engine reports it running.
    /// Returns the container id.
    async fn create_container(
        &self,
        ctx: &OpContext,
        spec: ContainerSpec,
    ) -> Result<String, EngineError>;

    /// Block until the container's process exits; returns its exit code.
    async fn wait_exit(&self, ctx: &OpContext, id: &str) -> Result<i64, EngineError>;

    /// Everything the container has written to stdout and stderr so far.
    async fn logs(&self, ctx: &OpContext, id: &str) -> Result<String, EngineError>;

    /// `None` when the engine no longer knows the container.
    async fn inspect(&self, ctx: &OpContext, id: &str)
        -> Result<Option<ContainerStatus>, EngineError>;

    async fn stop_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError>;

    /// Force-remove the container and its anonymous volumes. A container
    /// that is already gone counts as removed.
    async fn remove_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ContainerEngine, ContainerStatus, EngineConnector, EngineError};
    use crate::context::{OpContext, Step};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tfpod_core::{ContainerSpec, RegistryAuth};

    /// Recorded engine call
    #[derive(Debug, Clone, PartialEq)]
    pub enum EngineCall {
        Connect,
        Pull { image: String, username: Option<String> },
        Create { spec: ContainerSpec },
        WaitExit { id: String },
        Logs { id: String },
        Inspect { id: String },
        Stop { id: String },
        Remove { id: String },
    }

    #[derive(Debug, Clone)]
    pub struct FakeContainer {
        pub spec: ContainerSpec,
        pub running: bool,
        pub exit_code: i64,
        pub logs: String,
    }

    #[derive(Default)]
    struct FakeEngineState {
        calls: Vec<EngineCall>,
        containers: HashMap<String, FakeContainer>,
        failures: HashMap<Step, EngineError>,
        hangs: HashSet<Step>,
        next_id: u64,
        exit_code: i64,
        logs: String,
    }

    /// In-memory engine that records calls. Acts as its own connector.
    #[derive(Clone, Default)]
    pub struct FakeEngine {
        inner: Arc<Mutex<FakeEngineState>>,
    }

    impl FakeEngine {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `step` fail with `error`.
        pub fn fail_on(&self, step: Step, error: EngineError) {
            self.inner.lock().failures.insert(step, error);
        }

        /// Make `step` never complete, so only deadlines and cancellation end it.
        pub fn hang_on(&self, step: Step) {
            self.inner.lock().hangs.insert(step);
        }

        /// Exit code and log text for containers created from now on.
        pub fn set_outcome(&self, exit_code: i64, logs: impl Into<String>) {
            let mut state = self.inner.lock();
            state.exit_code = exit_code;
            state.logs = logs.into();
        }

        /// Pretend a container was created outside this fake's calls.
        pub fn insert_container(&self, id: impl Into<String>, spec: ContainerSpec) {
            self.inner.lock().containers.insert(
                id.into(),
                FakeContainer { spec, running: true, exit_code: 0, logs: String::new() },
            );
        }

        /// Drop a container as if it were removed behind our back.
        pub fn forget_container(&self, id: &str) {
            self.inner.lock().containers.remove(id);
        }

        pub fn container(&self, id: &str) -> Option<FakeContainer> {
            self.inner.lock().containers.get(id).cloned()
        }

        pub fn container_ids(&self) -> Vec<String> {
            let mut ids: Vec<_> = self.inner.lock().containers.keys().cloned().collect();
            ids.sort();
            ids
        }

        pub fn calls(&self) -> Vec<EngineCall> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, call: EngineCall) {
            self.inner.lock().calls.push(call);
        }

        async fn gate(&self, ctx: &OpContext, step: Step) -> Result<(), EngineError> {
            let (hang, failure) = {
                let state = self.inner.lock();
                (state.hangs.contains(&step), state.failures.get(&step).cloned())
            };
            ctx.run(step, async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                failure.map_or(Ok(()), Err)
            })
            .await
        }
    }

    #[async_trait]
    impl EngineConnector for FakeEngine {
        type Engine = FakeEngine;

        async fn connect(&self, ctx: &OpContext) -> Result<FakeEngine, EngineError> {
            self.record(EngineCall::Connect);
            self.gate(ctx, Step::Connect).await?;
            Ok(self.clone())
        }
    }

    #[async_trait]
    impl ContainerEngine for FakeEngine {
        async fn pull_image(
            &self,
            ctx: &OpContext,
            image: &str,
            auth: Option<&RegistryAuth>,
        ) -> Result<(), EngineError> {
            self.record(EngineCall::Pull {
                image: image.to_string(),
                username: auth.and_then(|a| a.username.clone()),
            });
            self.gate(ctx, Step::Pull).await
        }

        async fn create_container(
            &self,
            ctx: &OpContext,
            mut spec: ContainerSpec,
        ) -> Result<String, EngineError> {
            spec.terminal = true;
            self.record(EngineCall::Create { spec: spec.clone() });
            self.gate(ctx, Step::Create).await?;

            // Created containers stay behind when start fails, as on the real engine.
            let id = {
                let mut state = self.inner.lock();
                state.next_id += 1;
                let id = format!("fake-{:04}", state.next_id);
                let container = FakeContainer {
                    spec,
                    running: false,
                    exit_code: state.exit_code,
                    logs: state.logs.clone(),
                };
                state.containers.insert(id.clone(), container);
                id
            };

            self.gate(ctx, Step::Start).await?;
            self.gate(ctx, Step::WaitRunning).await?;
            if let Some(container) = self.inner.lock().containers.get_mut(&id) {
                container.running = true;
            }
            Ok(id)
        }

        async fn wait_exit(&self, ctx: &OpContext, id: &str) -> Result<i64, EngineError> {
            self.record(EngineCall::WaitExit { id: id.to_string() });
            self.gate(ctx, Step::WaitExit).await?;
            let mut state = self.inner.lock();
            let container =
                state.containers.get_mut(id).ok_or_else(|| EngineError::NotFound(id.to_string()))?;
            container.running = false;
            Ok(container.exit_code)
        }

        async fn logs(&self, ctx: &OpContext, id: &str) -> Result<String, EngineError> {
            self.record(EngineCall::Logs { id: id.to_string() });
            self.gate(ctx, Step::Logs).await?;
            self.container(id)
                .map(|c| c.logs)
                .ok_or_else(|| EngineError::NotFound(id.to_string()))
        }

        async fn inspect(
            &self,
            ctx: &OpContext,
            id: &str,
        ) -> Result<Option<ContainerStatus>, EngineError> {
            self.record(EngineCall::Inspect { id: id.to_string() });
            self.gate(ctx, Step::Inspect).await?;
            Ok(self.container(id).map(|c| ContainerStatus {
                id: id.to_string(),
                running: c.running,
                status: if c.running { "running" } else { "exited" }.to_string(),
                exit_code: (!c.running).then_some(c.exit_code),
            }))
        }

        async fn stop_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
            self.record(EngineCall::Stop { id: id.to_string() });
            self.gate(ctx, Step::Stop).await?;
            match self.inner.lock().containers.get_mut(id) {
                Some(c) => {
                    c.running = false;
                    Ok(())
                }
                None => Err(EngineError::NotFound(id.to_string())),
            }
        }

        async fn remove_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
            self.record(EngineCall::Remove { id: id.to_string() });
            self.gate(ctx, Step::Remove).await?;
            self.inner.lock().containers.remove(id);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeContainer, FakeEngine};

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
