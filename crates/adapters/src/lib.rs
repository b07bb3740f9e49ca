// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfpod-adapters: container engine access for the Podman provider

pub mod context;
mod convert;
pub mod engine;
pub mod podman;

pub use context::{OpContext, Step, Timeouts};
pub use convert::container_config;
pub use engine::{ContainerEngine, ContainerStatus, EngineConnector, EngineError};
pub use podman::{PodmanConnector, PodmanEngine};

#[cfg(any(test, feature = "test-support"))]
pub use engine::{EngineCall, FakeContainer, FakeEngine};
