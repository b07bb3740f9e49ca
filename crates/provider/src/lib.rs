// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfpod-provider: the Podman provider plugin
//!
//! Registers the `podman_container` resource and the provider-level
//! registry credentials, and serves the plugin boundary.

pub mod commands;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod exit_error;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod tf_file;

pub use dispatch::{serve, ServeError};
pub use error::{ConfigError, ProviderError};
pub use exit_error::ExitError;
pub use provider::{provider_schema, Provider, ProviderConfig};
pub use registry::{ResourceRegistry, CONTAINER_RESOURCE};
pub use resource::{Applied, Planned, Resource, ResourceCtx};
pub use tf_file::{load_file, HclError, ResourceBlock, TfFile};
