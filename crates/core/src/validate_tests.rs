// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

const CONTROL_PATTERN: &str = r"^(pause|continue-mate|break)$";

#[yare::parameterized(
    pause         = { "pause",         true },
    continue_mate = { "continue-mate", true },
    no_match      = { "doesnotmatch",  false },
    prefix_only   = { "pause-now",     false },
)]
fn pattern_validator(value: &str, ok: bool) {
    assert_eq!(matches_pattern(CONTROL_PATTERN, value).is_ok(), ok);
}

#[test]
fn pattern_mismatch_carries_value() {
    let err = matches_pattern(CONTROL_PATTERN, "nope").unwrap_err();
    assert_eq!(
        err,
        ValidationFailure::PatternMismatch {
            pattern: CONTROL_PATTERN.to_string(),
            value: "nope".to_string()
        }
    );
}

#[test]
fn uncompilable_pattern_is_invalid_pattern() {
    let err = matches_pattern("^(unclosed", "anything").unwrap_err();
    assert!(matches!(err, ValidationFailure::InvalidPattern { .. }));
}

#[yare::parameterized(
    unix_root     = { "/",               true },
    unix_nested   = { "/var/lib/data",   true },
    windows_drive = { r"C:\data",        true },
    lower_drive   = { r"d:\",            true },
    relative      = { "data/dir",        false },
    dot_relative  = { "./data",          false },
    empty         = { "",                false },
    drive_no_sep  = { "C:data",          false },
)]
fn absolute_path_validator(value: &str, ok: bool) {
    assert_eq!(absolute_path(value).is_ok(), ok);
}

#[test]
fn absolute_path_failure_is_not_absolute_path() {
    assert_eq!(
        absolute_path("relative").unwrap_err(),
        ValidationFailure::NotAbsolutePath { value: "relative".to_string() }
    );
}

#[test]
fn absolute_path_validator_is_idempotent() {
    let path = AttrPath::attr("volumes").push_index(0).push_attr("host_path");
    let value = json!("not/absolute");
    let first = Validator::AbsolutePath.check(&value, &path);
    let second = Validator::AbsolutePath.check(&value, &path);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[yare::parameterized(
    zero     = { "0s",    true },
    seconds  = { "30s",   true },
    compound = { "1m30s", true },
    negative = { "-1s",   false },
    garbage  = { "soon",  false },
    no_unit  = { "10",    false },
)]
fn duration_validator(value: &str, ok: bool) {
    assert_eq!(non_negative_duration(value).is_ok(), ok);
}

#[test]
fn negative_duration_is_invalid_duration() {
    let err = non_negative_duration("-5m").unwrap_err();
    assert!(matches!(err, ValidationFailure::InvalidDuration { ref reason, .. } if reason.contains("negative")));
}

#[yare::parameterized(
    equal = { 0, 0,  true },
    above = { 0, 3,  true },
    below = { 0, -1, false },
    high  = { 5, 4,  false },
)]
fn minimum_validator(minimum: i64, value: i64, ok: bool) {
    assert_eq!(at_least(minimum, value).is_ok(), ok);
}

#[test]
fn diagnostic_summary_quotes_attribute_path() {
    let path = AttrPath::attr("healthcheck").push_index(0).push_attr("retries");
    let diag = Validator::AtLeast(0).check(&json!(-2), &path).unwrap();
    assert_eq!(diag.summary, r#""healthcheck[0].retries" cannot be lower than 0"#);
    assert_eq!(diag.attribute, Some(path));
}

#[test]
fn null_values_are_not_validated() {
    assert!(Validator::AbsolutePath.check(&Value::Null, &AttrPath::root()).is_none());
}

#[test]
fn wrong_type_is_reported() {
    let diag = Validator::NonNegativeDuration.check(&json!(5), &AttrPath::attr("interval")).unwrap();
    assert!(diag.summary.contains("expected a string value"));
}
