// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Podman engine over its Docker-compatible REST socket.
//!
//! Each lifecycle operation calls [`PodmanConnector::connect`], which opens
//! a client on the unix socket and pings it. The resulting [`PodmanEngine`]
//! lives for that operation only.

use crate::context::{OpContext, Step};
use crate::convert;
use crate::engine::{ContainerEngine, ContainerStatus, EngineConnector, EngineError};
use async_trait::async_trait;
use bollard::auth::DockerCredentials;
use bollard::container::{
    CreateContainerOptions, InspectContainerOptions, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions, WaitContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tfpod_core::{ContainerSpec, RegistryAuth};

/// Seconds the engine waits for a graceful stop before killing.
const STOP_GRACE_SECS: i64 = 10;

/// Start timestamp the engine reports for a container that never started.
const ZERO_TIME_PREFIX: &str = "0001-01-01";

/// Opens sessions on a Podman socket.
#[derive(Debug, Clone)]
pub struct PodmanConnector {
    socket: PathBuf,
}

impl PodmanConnector {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self { socket: socket.into() }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }
}

#[async_trait]
impl EngineConnector for PodmanConnector {
    type Engine = PodmanEngine;

    async fn connect(&self, ctx: &OpContext) -> Result<PodmanEngine, EngineError> {
        let socket = self.socket.display().to_string();
        let connection_error =
            |message: String| EngineError::Connection { socket: socket.clone(), message };

        // Our own deadlines govern each call; the client-wide timeout only
        // has to outlast the longest of them.
        let t = &ctx.timeouts;
        let client_timeout = [t.connect, t.pull, t.start, t.attach, t.stop]
            .into_iter()
            .max()
            .unwrap_or(Duration::from_secs(120));

        let docker = Docker::connect_with_unix(
            &socket,
            client_timeout.as_secs().max(1),
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| connection_error(e.to_string()))?;

        ctx.run(Step::Connect, async {
            docker.ping().await.map_err(|e| connection_error(engine_message(e)))
        })
        .await?;

        tracing::debug!(%socket, "connected to podman");
        Ok(PodmanEngine { docker, poll: ctx.timeouts.poll })
    }
}

/// A live session with Podman.
pub struct PodmanEngine {
    docker: Docker,
    poll: Duration,
}

impl PodmanEngine {
    async fn start_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
        ctx.run(Step::Start, async {
            self.docker
                .start_container(id, None::<StartContainerOptions<String>>)
                .await
                .map_err(|e| EngineError::Start(engine_message(e)))
        })
        .await?;
        self.wait_running(ctx, id).await
    }

    /// Poll until the container is running. A container that already ran
    /// and exited also counts: it did reach the running state.
    async fn wait_running(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
        ctx.run(Step::WaitRunning, async {
            let mut attempt = 0u32;
            loop {
                if attempt > 0 {
                    tokio::time::sleep(self.poll).await;
                }
                attempt += 1;

                let info = self
                    .docker
                    .inspect_container(id, None::<InspectContainerOptions>)
                    .await
                    .map_err(|e| EngineError::Wait(engine_message(e)))?;
                let Some(state) = info.state else { continue };

                if state.running.unwrap_or(false) || has_started(state.started_at.as_deref()) {
                    tracing::debug!(container_id = %id, attempt, "container reached running state");
                    return Ok(());
                }
                if state.dead.unwrap_or(false) {
                    return Err(EngineError::Wait(format!(
                        "container {id} is dead: {}",
                        state.error.unwrap_or_default()
                    )));
                }
            }
        })
        .await
    }
}

#[async_trait]
impl ContainerEngine for PodmanEngine {
    async fn pull_image(
        &self,
        ctx: &OpContext,
        image: &str,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), EngineError> {
        let (from_image, tag) = split_reference(image);
        let credentials = auth.map(|a| DockerCredentials {
            username: a.username.clone(),
            password: a.password.clone(),
            serveraddress: Some(a.host()),
            ..Default::default()
        });
        let options = CreateImageOptions { from_image, tag, ..Default::default() };

        ctx.run(Step::Pull, async {
            let mut progress = self.docker.create_image(Some(options), None, credentials);
            while let Some(item) = progress.next().await {
                let info = item.map_err(|e| EngineError::ImagePull(engine_message(e)))?;
                if let Some(error) = info.error {
                    return Err(EngineError::ImagePull(error));
                }
                if let Some(status) = info.status {
                    tracing::trace!(%image, %status, "pull progress");
                }
            }
            Ok(())
        })
        .await
    }

    async fn create_container(
        &self,
        ctx: &OpContext,
        mut spec: ContainerSpec,
    ) -> Result<String, EngineError> {
        spec.terminal = true;
        let options = CreateContainerOptions { name: spec.name.clone(), platform: None };
        let config = convert::container_config(&spec);

        let created = ctx
            .run(Step::Create, async {
                self.docker
                    .create_container(Some(options), config)
                    .await
                    .map_err(|e| EngineError::Creation(engine_message(e)))
            })
            .await?;
        for warning in &created.warnings {
            tracing::warn!(container_id = %created.id, %warning, "engine warning on create");
        }

        if let Err(e) = self.start_container(ctx, &created.id).await {
            tracing::warn!(container_id = %created.id, error = %e, "container created but not started");
            return Err(e);
        }
        Ok(created.id)
    }

    async fn wait_exit(&self, ctx: &OpContext, id: &str) -> Result<i64, EngineError> {
        ctx.run(Step::WaitExit, async {
            let options = WaitContainerOptions { condition: "not-running".to_string() };
            let mut waiter = self.docker.wait_container(id, Some(options));
            match waiter.next().await {
                Some(Ok(response)) => Ok(response.status_code),
                // Non-zero exits arrive as errors carrying the code.
                Some(Err(BollardError::DockerContainerWaitError { code, .. })) => Ok(code),
                Some(Err(e)) => Err(EngineError::Wait(engine_message(e))),
                None => Err(EngineError::Wait(format!("wait for container {id} ended without a status"))),
            }
        })
        .await
    }

    async fn logs(&self, ctx: &OpContext, id: &str) -> Result<String, EngineError> {
        ctx.run(Step::Logs, async {
            let options = LogsOptions::<String> {
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            };
            let mut chunks = self.docker.logs(id, Some(options));
            let mut out = String::new();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(|e| EngineError::Logs(engine_message(e)))?;
                out.push_str(&chunk.to_string());
            }
            Ok(out)
        })
        .await
    }

    async fn inspect(
        &self,
        ctx: &OpContext,
        id: &str,
    ) -> Result<Option<ContainerStatus>, EngineError> {
        ctx.run(Step::Inspect, async {
            let info = match self.docker.inspect_container(id, None::<InspectContainerOptions>).await {
                Ok(info) => info,
                Err(e) if is_not_found(&e) => return Ok(None),
                Err(e) => return Err(EngineError::Inspect(engine_message(e))),
            };
            let state = info.state.unwrap_or_default();
            let running = state.running.unwrap_or(false);
            Ok(Some(ContainerStatus {
                id: info.id.unwrap_or_else(|| id.to_string()),
                running,
                status: state.status.map(|s| s.to_string()).unwrap_or_default(),
                exit_code: if running { None } else { state.exit_code },
            }))
        })
        .await
    }

    async fn stop_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
        ctx.run(Step::Stop, async {
            let options = StopContainerOptions { t: STOP_GRACE_SECS };
            match self.docker.stop_container(id, Some(options)).await {
                Ok(()) => Ok(()),
                Err(e) if is_not_modified(&e) => Ok(()),
                Err(e) if is_not_found(&e) => Err(EngineError::NotFound(id.to_string())),
                Err(e) => Err(EngineError::Stop(engine_message(e))),
            }
        })
        .await
    }

    async fn remove_container(&self, ctx: &OpContext, id: &str) -> Result<(), EngineError> {
        ctx.run(Step::Remove, async {
            let options = RemoveContainerOptions { v: true, force: true, link: false };
            match self.docker.remove_container(id, Some(options)).await {
                Ok(()) => Ok(()),
                Err(e) if is_not_found(&e) => {
                    tracing::debug!(container_id = %id, "container already gone");
                    Ok(())
                }
                Err(e) => Err(EngineError::Remove(engine_message(e))),
            }
        })
        .await
    }
}

/// The engine's own message, without the client's status-code wrapper.
fn engine_message(error: BollardError) -> String {
    match error {
        BollardError::DockerResponseServerError { message, .. } => message,
        other => other.to_string(),
    }
}

fn is_not_found(error: &BollardError) -> bool {
    matches!(error, BollardError::DockerResponseServerError { status_code: 404, .. })
}

fn is_not_modified(error: &BollardError) -> bool {
    matches!(error, BollardError::DockerResponseServerError { status_code: 304, .. })
}

fn has_started(started_at: Option<&str>) -> bool {
    started_at.is_some_and(|t| !t.is_empty() && !t.starts_with(ZERO_TIME_PREFIX))
}

/// Split an image reference into repository and tag, defaulting to
/// `latest`. Digest references are passed through whole.
fn split_reference(image: &str) -> (String, String) {
    if image.contains('@') {
        return (image.to_string(), String::new());
    }
    let name_start = image.rfind('/').map_or(0, |i| i + 1);
    match image[name_start..].rfind(':') {
        Some(i) => {
            let at = name_start + i;
            (image[..at].to_string(), image[at + 1..].to_string())
        }
        None => (image.to_string(), "latest".to_string()),
    }
}

#[cfg(test)]
#[path = "podman_tests.rs"]
mod tests;
