// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::Timeouts;

#[yare::parameterized(
    bare          = { "nginx",                          "nginx",                       "latest" },
    tagged        = { "nginx:1.27",                     "nginx",                       "1.27" },
    registry_port = { "registry.local:5000/app",        "registry.local:5000/app",     "latest" },
    port_and_tag  = { "registry.local:5000/app:v2",     "registry.local:5000/app",     "v2" },
    nested        = { "quay.io/podman/hello:latest",    "quay.io/podman/hello",        "latest" },
    digest        = { "alpine@sha256:abcd",             "alpine@sha256:abcd",          "" },
)]
fn image_reference_split(image: &str, repo: &str, tag: &str) {
    assert_eq!(split_reference(image), (repo.to_string(), tag.to_string()));
}

#[test]
fn server_errors_keep_engine_message() {
    let err = BollardError::DockerResponseServerError {
        status_code: 500,
        message: "initializing source docker://nginx:nope: reading manifest nope: manifest unknown".to_string(),
    };
    assert_eq!(
        engine_message(err),
        "initializing source docker://nginx:nope: reading manifest nope: manifest unknown"
    );
}

#[yare::parameterized(
    not_found    = { 404, true,  false },
    not_modified = { 304, false, true },
    server       = { 500, false, false },
)]
fn status_classification(status_code: u16, not_found: bool, not_modified: bool) {
    let err = BollardError::DockerResponseServerError { status_code, message: String::new() };
    assert_eq!(is_not_found(&err), not_found);
    assert_eq!(is_not_modified(&err), not_modified);
}

#[yare::parameterized(
    never   = { None,                                   false },
    zero    = { Some("0001-01-01T00:00:00Z"),           false },
    empty   = { Some(""),                               false },
    started = { Some("2026-10-18T09:15:02.123456789Z"), true },
)]
fn start_timestamp(started_at: Option<&str>, started: bool) {
    assert_eq!(has_started(started_at), started);
}

#[tokio::test]
async fn missing_socket_is_connection_error() {
    let dir = std::env::temp_dir().join("tfpod-no-such-dir");
    let connector = PodmanConnector::new(dir.join("podman.sock"));
    let ctx = OpContext::new(
        Timeouts::default().connect(Duration::from_secs(2)),
        tokio_util::sync::CancellationToken::new(),
    );
    let err = connector.connect(&ctx).await.err().unwrap();
    assert!(matches!(err, EngineError::Connection { .. }), "unexpected error: {err}");
}
