// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfpod-core: schema, attribute translation and validation for the Podman provider

pub mod macros;

pub mod attrs;
pub mod auth;
pub mod coerce;
pub mod diagnostic;
pub mod duration;
pub mod error;
pub mod schema;
pub mod spec;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use attrs::{ContainerAttributes, MountKind, Propagation, RestartPolicy};
pub use auth::{auth_for_image, registry_host, RegistryAuth};
pub use diagnostic::{has_errors, AttrPath, Diagnostic, PathStep, Severity};
pub use duration::{parse_duration_nanos, DurationError};
pub use error::{DecodeError, SpecError, ValidationError};
pub use schema::{Attribute, Block, Kind, Schema};
pub use spec::{ContainerSpec, HealthConfig, MountSpec, NamedVolume, Namespace, PortMapping};
pub use validate::{ValidationFailure, Validator};
