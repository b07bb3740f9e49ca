// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while turning attributes into a container specification.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Raw attribute values could not be decoded into their typed form.
#[derive(Debug, Error)]
#[error("invalid {what}: {source}")]
pub struct DecodeError {
    pub what: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Decode a raw attribute object into a typed configuration struct.
pub fn decode<T: DeserializeOwned>(what: &'static str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError { what, source })
}

/// A malformed attribute combination, detected before any engine call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Both a container and a path specified in a volume entry")]
    VolumeBothSources,
    #[error("Volume entry without container path or source container")]
    VolumeNoSource,
    #[error("values for command may not be empty")]
    EmptyCommandArg,
    #[error("env entry {0:?} is not of the form KEY=VALUE")]
    MalformedEnv(String),
    #[error("value for {key:?} is not representable as a string")]
    NotAString { key: String },
    #[error("invalid DNS server address {0:?}")]
    InvalidDnsServer(String),
    #[error("healthcheck {field} is not a valid duration: {reason}")]
    InvalidHealthcheck { field: &'static str, reason: String },
    #[error("{field} cannot be lower than 0")]
    Negative { field: &'static str },
    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },
}

/// Building a container specification from raw attributes failed.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Unable to parse volumes: {0}")]
    Volumes(ValidationError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl SpecError {
    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            SpecError::Volumes(e) | SpecError::Invalid(e) => Some(e),
            SpecError::Decode(_) => None,
        }
    }
}
