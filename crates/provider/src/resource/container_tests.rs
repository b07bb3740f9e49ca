// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::provider::ProviderConfig;
use serde_json::json;
use std::sync::Arc;
use tfpod_adapters::{EngineCall, FakeEngine, OpContext, Timeouts};
use tfpod_core::test_support::{web_attributes, web_attributes_with};
use tfpod_core::RegistryAuth;
use tokio_util::sync::CancellationToken;

fn setup() -> (FakeEngine, ContainerResource<FakeEngine>) {
    let fake = FakeEngine::new();
    (fake.clone(), ContainerResource::new(fake))
}

fn planned(resource: &ContainerResource<FakeEngine>, attrs: Value) -> Value {
    let plan = resource.plan(None, Some(attrs));
    assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
    plan.planned_state.unwrap()
}

fn error_summary(applied: &Applied) -> &str {
    let diag = applied.diagnostics.iter().find(|d| d.is_error()).unwrap();
    &diag.summary
}

// ── create ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_persists_container_id() {
    let (fake, resource) = setup();
    let state = planned(&resource, web_attributes());

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert!(applied.diagnostics.is_empty(), "{:?}", applied.diagnostics);
    let new_state = applied.new_state.unwrap();
    assert_eq!(new_state["id"], "fake-0001");
    assert_eq!(new_state["name"], "web");
    assert_eq!(fake.container_ids(), vec!["fake-0001".to_string()]);

    let calls = fake.calls();
    assert_eq!(calls[0], EngineCall::Connect);
    assert_eq!(calls[1], EngineCall::Pull { image: "nginx:latest".to_string(), username: None });
    let EngineCall::Create { spec } = &calls[2] else { panic!("expected create, got {:?}", calls[2]) };
    assert!(spec.terminal);
    assert_eq!(spec.port_mappings.len(), 1);
    assert_eq!(spec.port_mappings[0].host_port, 8080);
}

#[tokio::test]
async fn pull_failure_persists_nothing() {
    let (fake, resource) = setup();
    fake.fail_on(
        Step::Pull,
        EngineError::ImagePull("reading manifest latest in docker.io/library/nginx: manifest unknown".to_string()),
    );
    let state = planned(&resource, web_attributes());

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert_eq!(applied.new_state, None);
    assert_eq!(
        error_summary(&applied),
        "Unable to create container with image nginx:latest: reading manifest latest in docker.io/library/nginx: manifest unknown"
    );
    assert!(fake.container_ids().is_empty());
    assert!(!fake.calls().iter().any(|c| matches!(c, EngineCall::Create { .. })));
}

#[tokio::test]
async fn translation_errors_never_reach_the_engine() {
    let (fake, resource) = setup();
    let state = web_attributes_with(json!({
        "volumes": [{ "from_container": "a", "container_path": "/data" }],
    }));

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert_eq!(applied.new_state, None);
    assert_eq!(
        error_summary(&applied),
        "Unable to parse volumes: Both a container and a path specified in a volume entry"
    );
    assert_eq!(applied.diagnostics[0].attribute, Some(AttrPath::attr("volumes")));
    assert!(fake.calls().is_empty());
}

async fn create_failure(step: Step, error: EngineError) -> (FakeEngine, Applied) {
    let (fake, resource) = setup();
    fake.fail_on(step, error);
    let state = planned(&resource, web_attributes());
    let applied = resource.create(&ResourceCtx::default(), state).await;
    (fake, applied)
}

#[tokio::test]
async fn creation_failure_is_prefixed() {
    let (fake, applied) =
        create_failure(Step::Create, EngineError::Creation("name \"web\" is in use".to_string())).await;
    assert_eq!(applied.new_state, None);
    assert!(fake.container_ids().is_empty());
    assert_eq!(error_summary(&applied), "Unable to create container: name \"web\" is in use");
}

#[tokio::test]
async fn start_failure_is_prefixed() {
    let (fake, applied) = create_failure(Step::Start, EngineError::Start("OCI runtime error".to_string())).await;
    assert_eq!(applied.new_state, None);
    assert_eq!(error_summary(&applied), "Unable to start container: OCI runtime error");

    // No rollback: the created container is left on the engine, not running.
    let ids = fake.container_ids();
    assert_eq!(ids, vec!["fake-0001".to_string()]);
    assert!(!fake.container(&ids[0]).unwrap().running);
    assert!(!fake.calls().iter().any(|c| matches!(c, EngineCall::Remove { .. })));
}

#[tokio::test]
async fn connection_failure_is_reported() {
    let (fake, resource) = setup();
    fake.fail_on(
        Step::Connect,
        EngineError::Connection {
            socket: "/run/user/1000/podman/podman.sock".to_string(),
            message: "No such file or directory".to_string(),
        },
    );
    let state = planned(&resource, web_attributes());

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert_eq!(applied.new_state, None);
    assert!(error_summary(&applied).contains("/run/user/1000/podman/podman.sock"));
    assert_eq!(fake.calls(), vec![EngineCall::Connect]);
}

#[tokio::test]
async fn attached_container_captures_logs() {
    let (fake, resource) = setup();
    fake.set_outcome(0, "hello from the container\n");
    let state = planned(&resource, web_attributes_with(json!({ "attach": true, "logs": true })));

    let applied = resource.create(&ResourceCtx::default(), state).await;

    let new_state = applied.new_state.unwrap();
    assert_eq!(new_state["container_logs"], "hello from the container\n");
    let calls = fake.calls();
    assert!(calls.contains(&EngineCall::WaitExit { id: "fake-0001".to_string() }));
    assert!(calls.contains(&EngineCall::Logs { id: "fake-0001".to_string() }));
    assert!(!fake.container("fake-0001").unwrap().running);
}

#[tokio::test]
async fn attach_without_logs_skips_log_read() {
    let (fake, resource) = setup();
    let state = planned(&resource, web_attributes_with(json!({ "attach": true })));

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert_eq!(applied.new_state.unwrap()["container_logs"], Value::Null);
    assert!(!fake.calls().iter().any(|c| matches!(c, EngineCall::Logs { .. })));
}

#[tokio::test]
async fn attach_failure_keeps_created_container_in_state() {
    let (fake, resource) = setup();
    fake.fail_on(Step::WaitExit, EngineError::Wait("container killed".to_string()));
    let state = planned(&resource, web_attributes_with(json!({ "attach": true })));

    let applied = resource.create(&ResourceCtx::default(), state).await;

    assert_eq!(applied.new_state.as_ref().unwrap()["id"], "fake-0001");
    assert_eq!(error_summary(&applied), "Unable to wait container end of execution: container killed");
}

#[tokio::test]
async fn registry_credentials_match_image_host() {
    let (fake, resource) = setup();
    let ctx = ResourceCtx {
        config: Arc::new(ProviderConfig {
            registry_auth: vec![
                RegistryAuth::new("https://index.docker.io/v1/").username("hub-user"),
                RegistryAuth::new("quay.io").username("quay-user").password("secret"),
            ],
        }),
        ..ResourceCtx::default()
    };
    let state = planned(&resource, web_attributes_with(json!({ "image": "quay.io/podman/hello:latest" })));

    resource.create(&ctx, state).await;

    assert_eq!(
        fake.calls()[1],
        EngineCall::Pull {
            image: "quay.io/podman/hello:latest".to_string(),
            username: Some("quay-user".to_string()),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn hung_pull_hits_its_deadline() {
    let (fake, resource) = setup();
    fake.hang_on(Step::Pull);
    let ctx = ResourceCtx {
        op: OpContext::new(
            Timeouts::default().pull(std::time::Duration::from_secs(30)),
            CancellationToken::new(),
        ),
        ..ResourceCtx::default()
    };
    let state = planned(&resource, web_attributes());

    let applied = resource.create(&ctx, state).await;

    assert_eq!(applied.new_state, None);
    assert_eq!(error_summary(&applied), "Unable to create container with image nginx:latest: pull timed out after 30s");
}

#[tokio::test]
async fn cancelled_operation_stops_before_engine_work() {
    let (fake, resource) = setup();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = ResourceCtx { op: OpContext::new(Timeouts::default(), cancel), ..ResourceCtx::default() };
    let state = planned(&resource, web_attributes());

    let applied = resource.create(&ctx, state).await;

    assert_eq!(applied.new_state, None);
    assert_eq!(error_summary(&applied), "connect cancelled");
    assert!(fake.container_ids().is_empty());
}

// ── read / update / delete ──────────────────────────────────────────────

async fn created(fake: &FakeEngine, resource: &ContainerResource<FakeEngine>) -> Value {
    let state = planned(resource, web_attributes());
    let new_state = resource.create(&ResourceCtx::default(), state).await.new_state.unwrap();
    assert_eq!(fake.container_ids().len(), 1);
    new_state
}

#[tokio::test]
async fn read_keeps_existing_container() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;

    let applied = resource.read(&ResourceCtx::default(), state.clone()).await;

    assert_eq!(applied.new_state, Some(state));
    assert!(fake.calls().contains(&EngineCall::Inspect { id: "fake-0001".to_string() }));
}

#[tokio::test]
async fn read_drops_container_removed_outside() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;
    fake.forget_container("fake-0001");

    let applied = resource.read(&ResourceCtx::default(), state).await;

    assert_eq!(applied, Applied::gone());
}

#[tokio::test]
async fn read_without_id_drops_state() {
    let (fake, resource) = setup();
    let applied = resource.read(&ResourceCtx::default(), web_attributes()).await;
    assert_eq!(applied.new_state, None);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn read_failure_keeps_state() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;
    fake.fail_on(Step::Inspect, EngineError::Inspect("engine busy".to_string()));

    let applied = resource.read(&ResourceCtx::default(), state.clone()).await;

    assert_eq!(applied.new_state, Some(state));
    assert_eq!(error_summary(&applied), "Unable to inspect container fake-0001: engine busy");
}

#[tokio::test]
async fn update_stores_plan_without_engine_calls() {
    let (fake, resource) = setup();
    let prior = created(&fake, &resource).await;
    let calls_before = fake.calls().len();
    let mut proposed = prior.clone();
    proposed["restart"] = json!("always");
    let plan = resource.plan(Some(&prior), Some(proposed));
    assert!(plan.requires_replace.is_empty());

    let applied = resource.update(&ResourceCtx::default(), prior, plan.planned_state.unwrap()).await;

    let new_state = applied.new_state.unwrap();
    assert_eq!(new_state["restart"], "always");
    assert_eq!(new_state["id"], "fake-0001");
    assert_eq!(fake.calls().len(), calls_before);
}

#[tokio::test]
async fn delete_stops_then_removes() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;

    let applied = resource.delete(&ResourceCtx::default(), state).await;

    assert_eq!(applied, Applied::gone());
    assert!(fake.container_ids().is_empty());
    let calls = fake.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        &[EngineCall::Stop { id: "fake-0001".to_string() }, EngineCall::Remove { id: "fake-0001".to_string() }]
    );
}

#[tokio::test]
async fn delete_of_vanished_container_succeeds() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;
    fake.forget_container("fake-0001");

    let applied = resource.delete(&ResourceCtx::default(), state).await;

    assert_eq!(applied, Applied::gone());
}

#[tokio::test]
async fn stop_failure_still_removes() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;
    fake.fail_on(Step::Stop, EngineError::Stop("timeout waiting for SIGTERM".to_string()));

    let applied = resource.delete(&ResourceCtx::default(), state).await;

    assert_eq!(applied, Applied::gone());
    assert!(fake.container_ids().is_empty());
}

#[tokio::test]
async fn remove_failure_keeps_state() {
    let (fake, resource) = setup();
    let state = created(&fake, &resource).await;
    fake.fail_on(Step::Remove, EngineError::Remove("device or resource busy".to_string()));

    let applied = resource.delete(&ResourceCtx::default(), state.clone()).await;

    assert_eq!(applied.new_state, Some(state));
    assert_eq!(error_summary(&applied), "Unable to remove container fake-0001: device or resource busy");
}

// ── plan / validate ─────────────────────────────────────────────────────

#[test]
fn plan_for_create_leaves_outputs_empty() {
    let (_, resource) = setup();
    let plan = resource.plan(None, Some(web_attributes()));
    let state = plan.planned_state.unwrap();
    assert_eq!(state["id"], Value::Null);
    assert_eq!(state["container_logs"], Value::Null);
    assert_eq!(state["restart"], "no");
    assert!(plan.requires_replace.is_empty());
}

#[test]
fn plan_for_destroy_is_empty() {
    let (_, resource) = setup();
    let prior = web_attributes_with(json!({ "id": "abc" }));
    assert_eq!(resource.plan(Some(&prior), None), Planned::default());
}

#[test]
fn replacement_clears_outputs() {
    let (_, resource) = setup();
    let mut prior = planned(&resource, web_attributes());
    prior["id"] = json!("abc");
    let mut proposed = prior.clone();
    proposed["image"] = json!("nginx:1.27");

    let plan = resource.plan(Some(&prior), Some(proposed));

    assert_eq!(plan.requires_replace, vec![AttrPath::attr("image")]);
    assert_eq!(plan.planned_state.unwrap()["id"], Value::Null);
}

#[test]
fn single_blocks_are_wrapped() {
    let (_, resource) = setup();
    let attrs = web_attributes_with(json!({ "healthcheck": { "test": ["CMD", "true"], "interval": "5s" } }));
    let state = resource.plan(None, Some(attrs)).planned_state.unwrap();
    assert_eq!(state["healthcheck"][0]["interval"], "5s");
    assert_eq!(state["healthcheck"][0]["timeout"], "0s");
}

#[yare::parameterized(
    empty_command = { json!({ "command": ["echo", ""] }),                   "command" },
    no_source     = { json!({ "volumes": [{ "read_only": true }] }),        "volumes" },
    malformed_env = { json!({ "env": ["JUST_A_KEY"] }),                     "env" },
    bad_dns       = { json!({ "dns": ["resolver.local"] }),                 "dns" },
    bad_restart   = { json!({ "restart": "sometimes" }),                    "restart" },
)]
fn plan_reports_invalid_configuration(extra: Value, attribute: &str) {
    let (_, resource) = setup();
    let plan = resource.plan(None, Some(web_attributes_with(extra)));
    assert_eq!(plan.planned_state, None);
    assert!(has_errors(&plan.diagnostics));
    assert_eq!(plan.diagnostics[0].attribute, Some(AttrPath::attr(attribute)));
}

#[test]
fn validate_accepts_empty_volumes() {
    let (_, resource) = setup();
    let diags = resource.validate(&web_attributes_with(json!({ "volumes": [] })));
    assert!(diags.is_empty(), "{diags:?}");
}
