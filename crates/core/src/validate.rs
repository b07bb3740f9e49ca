// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan-time attribute validators.
//!
//! Each validator is a pure predicate over one attribute value and yields at
//! most one diagnostic. Nothing here talks to the engine.

use crate::diagnostic::{AttrPath, Diagnostic};
use crate::duration::parse_duration_nanos;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Windows drive path (`C:\...`) or a Unix absolute path.
const ABSOLUTE_PATH_PATTERN: &str = r"^[a-zA-Z]:\\|^/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("doesn't match the pattern ({pattern:?}): {value:?}")]
    PatternMismatch { pattern: String, value: String },
    #[error("{pattern:?} regex does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("must be an absolute path")]
    NotAbsolutePath { value: String },
    #[error("is not a valid duration: {reason}")]
    InvalidDuration { value: String, reason: String },
    #[error("cannot be lower than {minimum}")]
    BelowMinimum { value: i64, minimum: i64 },
    #[error("expected a {expected} value")]
    WrongType { expected: &'static str },
}

impl ValidationFailure {
    /// Render as a diagnostic naming the offending attribute.
    pub fn into_diagnostic(self, path: &AttrPath) -> Diagnostic {
        let summary = if path.is_root() {
            self.to_string()
        } else {
            format!("{:?} {}", path.to_string(), self)
        };
        Diagnostic::error(summary).at(path.clone())
    }
}

/// Value must match `pattern`.
///
/// A pattern that fails to compile is a bug in the schema declaration, not in
/// user input; it is still reported as a diagnostic so the host surfaces it.
pub fn matches_pattern(pattern: &str, value: &str) -> Result<(), ValidationFailure> {
    let re = Regex::new(pattern).map_err(|e| {
        tracing::error!(pattern, error = %e, "schema validator pattern does not compile");
        ValidationFailure::InvalidPattern { pattern: pattern.to_string(), reason: e.to_string() }
    })?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationFailure::PatternMismatch {
            pattern: pattern.to_string(),
            value: value.to_string(),
        })
    }
}

/// Value must be a Windows drive path or start with `/`.
pub fn absolute_path(value: &str) -> Result<(), ValidationFailure> {
    match matches_pattern(ABSOLUTE_PATH_PATTERN, value) {
        Ok(()) => Ok(()),
        Err(ValidationFailure::PatternMismatch { .. }) => {
            Err(ValidationFailure::NotAbsolutePath { value: value.to_string() })
        }
        Err(other) => Err(other),
    }
}

/// Value must parse as a duration that is not negative.
pub fn non_negative_duration(value: &str) -> Result<(), ValidationFailure> {
    match parse_duration_nanos(value) {
        Ok(nanos) if nanos < 0 => Err(ValidationFailure::InvalidDuration {
            value: value.to_string(),
            reason: "duration must not be negative".to_string(),
        }),
        Ok(_) => Ok(()),
        Err(e) => {
            Err(ValidationFailure::InvalidDuration { value: value.to_string(), reason: e.to_string() })
        }
    }
}

/// Value must be at least `minimum`.
pub fn at_least(minimum: i64, value: i64) -> Result<(), ValidationFailure> {
    if value < minimum {
        Err(ValidationFailure::BelowMinimum { value, minimum })
    } else {
        Ok(())
    }
}

/// Declarative validator attached to a schema attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "arg", rename_all = "snake_case")]
pub enum Validator {
    Pattern(&'static str),
    AbsolutePath,
    NonNegativeDuration,
    AtLeast(i64),
}

impl Validator {
    /// Run against a raw attribute value. `null` is never validated.
    pub fn check(&self, value: &Value, path: &AttrPath) -> Option<Diagnostic> {
        if value.is_null() {
            return None;
        }
        let result = match self {
            Validator::Pattern(pattern) => {
                as_str(value).and_then(|s| matches_pattern(pattern, s))
            }
            Validator::AbsolutePath => as_str(value).and_then(absolute_path),
            Validator::NonNegativeDuration => as_str(value).and_then(non_negative_duration),
            Validator::AtLeast(minimum) => value
                .as_i64()
                .ok_or(ValidationFailure::WrongType { expected: "integer" })
                .and_then(|v| at_least(*minimum, v)),
        };
        result.err().map(|failure| failure.into_diagnostic(path))
    }
}

fn as_str(value: &Value) -> Result<&str, ValidationFailure> {
    value.as_str().ok_or(ValidationFailure::WrongType { expected: "string" })
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
