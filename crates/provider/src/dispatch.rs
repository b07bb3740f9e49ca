// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch loop for the plugin boundary.
//!
//! Requests are read in order and each one runs in its own task, so a long
//! apply does not hold up schema or plan calls. `ConfigureProvider` is the
//! exception: it is handled before the next frame is read, so every later
//! request sees the new configuration. Responses funnel through a single
//! writer task and may leave in any order; the envelope id pairs them with
//! their requests.

use crate::provider::Provider;
use serde_json::Value;
use std::sync::Arc;
use tfpod_wire::{decode, read_message, write_envelope, Envelope, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Responses waiting for the writer.
const RESPONSE_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("response writer failed: {0}")]
    Writer(#[from] JoinError),
}

/// Serve requests from `reader` until the host closes it.
///
/// In-flight operations are allowed to finish and their responses are
/// written before this returns.
pub async fn serve<R, W>(provider: Arc<Provider>, mut reader: R, writer: W) -> Result<(), ServeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Envelope<Response>>(RESPONSE_BUFFER);
    let writer_task = tokio::spawn(write_responses(writer, rx));
    let mut in_flight = JoinSet::new();

    info!(resources = ?provider.resources().type_names(), "serving plugin requests");
    let read_result = loop {
        let bytes = match read_message(&mut reader).await {
            Ok(bytes) => bytes,
            Err(ProtocolError::ConnectionClosed) => {
                debug!("host closed the connection");
                break Ok(());
            }
            Err(e) => break Err(e),
        };

        let envelope = match parse_request(&bytes) {
            Ok(envelope) => envelope,
            Err(reply) => {
                if tx.send(reply).await.is_err() {
                    warn!("response writer gone, dropping error reply");
                }
                continue;
            }
        };

        if matches!(envelope.body, Request::ConfigureProvider { .. }) {
            handle(&provider, envelope, &tx).await;
            continue;
        }

        let provider = Arc::clone(&provider);
        let tx = tx.clone();
        in_flight.spawn(async move { handle(&provider, envelope, &tx).await });
    };

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "request task failed");
        }
    }
    drop(tx);
    let write_result = writer_task.await?;

    read_result?;
    write_result?;
    Ok(())
}

async fn handle(provider: &Provider, envelope: Envelope<Request>, tx: &mpsc::Sender<Envelope<Response>>) {
    let Envelope { id, body: request } = envelope;
    let kind = request.kind();
    debug!(id, kind, "request received");
    let response = provider.handle(request).await;
    debug!(id, kind, "request handled");
    if tx.send(Envelope::new(id, response)).await.is_err() {
        warn!(id, kind, "response writer gone, dropping reply");
    }
}

/// Decode one frame. A frame that is not a request gets an error reply,
/// echoing its id when one can be read.
fn parse_request(bytes: &[u8]) -> Result<Envelope<Request>, Envelope<Response>> {
    let raw: Envelope<Value> = decode(bytes).map_err(|e| {
        warn!(error = %e, "undecodable frame");
        Envelope::new(0, Response::Error { message: e.to_string() })
    })?;
    match serde_json::from_value::<Request>(raw.body.clone()) {
        Ok(request) => Ok(raw.reply(request)),
        Err(e) => {
            warn!(id = raw.id, error = %e, "unknown request");
            Err(raw.reply(Response::Error { message: format!("invalid request: {e}") }))
        }
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<Envelope<Response>>,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = rx.recv().await {
        write_envelope(&mut writer, &envelope).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
