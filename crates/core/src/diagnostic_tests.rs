// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn path_display_mixes_attrs_indices_and_keys() {
    let path = AttrPath::attr("volumes").push_index(0).push_attr("host_path");
    assert_eq!(path.to_string(), "volumes[0].host_path");

    let path = AttrPath::attr("sysctls").push_key("net.core.somaxconn");
    assert_eq!(path.to_string(), r#"sysctls["net.core.somaxconn"]"#);
}

#[test]
fn root_path_is_dropped_from_diagnostic() {
    let diag = Diagnostic::error("boom").at(AttrPath::root());
    assert!(diag.attribute.is_none());
}

#[test]
fn error_copies_summary_into_detail() {
    let diag = Diagnostic::error("bad value");
    assert_eq!(diag.detail, "bad value");
    assert!(diag.is_error());
}

#[test]
fn display_includes_path() {
    let diag = Diagnostic::warning("ignored").at(AttrPath::attr("mounts"));
    assert_eq!(diag.to_string(), "warning: ignored (mounts)");
}

#[test]
fn has_errors_ignores_warnings() {
    assert!(!has_errors(&[Diagnostic::warning("w")]));
    assert!(has_errors(&[Diagnostic::warning("w"), Diagnostic::error("e")]));
}

#[test]
fn path_serializes_as_step_list() {
    let path = AttrPath::attr("ports").push_index(1);
    let json = serde_json::to_string(&path).unwrap();
    assert_eq!(json, r#"[{"attr":"ports"},{"index":1}]"#);
}
