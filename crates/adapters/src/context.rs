// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlines and cancellation for engine calls.
//!
//! Every engine call runs through [`OpContext::run`], which races it against
//! the step's deadline and the operation's cancellation token.

use crate::engine::EngineError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A named sub-step of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Connect,
    Pull,
    Create,
    Start,
    WaitRunning,
    WaitExit,
    Logs,
    Inspect,
    Stop,
    Remove,
}

tfpod_core::simple_display! {
    Step {
        Connect => "connect",
        Pull => "pull",
        Create => "create",
        Start => "start",
        WaitRunning => "wait-running",
        WaitExit => "wait-exit",
        Logs => "logs",
        Inspect => "inspect",
        Stop => "stop",
        Remove => "remove",
    }
}

/// Per-step deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub pull: Duration,
    /// Covers create, start and the wait for the running state.
    pub start: Duration,
    /// Waiting for an attached container to exit.
    pub attach: Duration,
    /// Covers stop, remove, inspect and log reads.
    pub stop: Duration,
    /// Interval between running-state polls.
    pub poll: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            pull: Duration::from_secs(10 * 60),
            start: Duration::from_secs(2 * 60),
            attach: Duration::from_secs(60 * 60),
            stop: Duration::from_secs(60),
            poll: Duration::from_millis(100),
        }
    }
}

impl Timeouts {
    tfpod_core::setters! {
        set {
            connect: Duration,
            pull: Duration,
            start: Duration,
            attach: Duration,
            stop: Duration,
            poll: Duration,
        }
    }

    pub fn for_step(&self, step: Step) -> Duration {
        match step {
            Step::Connect => self.connect,
            Step::Pull => self.pull,
            Step::Create | Step::Start | Step::WaitRunning => self.start,
            Step::WaitExit => self.attach,
            Step::Logs | Step::Inspect | Step::Stop | Step::Remove => self.stop,
        }
    }
}

/// Deadlines plus cancellation for one lifecycle operation.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    pub timeouts: Timeouts,
    pub cancel: CancellationToken,
}

impl OpContext {
    pub fn new(timeouts: Timeouts, cancel: CancellationToken) -> Self {
        Self { timeouts, cancel }
    }

    /// Run `fut` under the deadline for `step`. Cancellation wins over a
    /// result that is ready at the same time.
    pub async fn run<T, F>(&self, step: Step, fut: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        let after = self.timeouts.for_step(step);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled { step }),
            result = tokio::time::timeout(after, fut) => {
                result.unwrap_or(Err(EngineError::Timeout { step, after }))
            }
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
