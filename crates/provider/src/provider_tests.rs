// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::CONTAINER_RESOURCE;
use serial_test::serial;
use tfpod_adapters::{EngineCall, FakeEngine};
use tfpod_core::test_support::web_attributes;

fn provider() -> (FakeEngine, Provider) {
    let fake = FakeEngine::new();
    (fake.clone(), Provider::new(ResourceRegistry::podman(fake), Timeouts::default()))
}

#[test]
#[serial]
fn registry_auth_env_defaults() {
    std::env::set_var("DOCKER_REGISTRY_USER", "ci-bot");
    std::env::set_var("DOCKER_REGISTRY_PASS", "hunter2");

    let config = ProviderConfig::from_config(json!({
        "registry_auth": { "address": "registry.example.com" },
    }))
    .unwrap();

    std::env::remove_var("DOCKER_REGISTRY_USER");
    std::env::remove_var("DOCKER_REGISTRY_PASS");

    assert_eq!(config.registry_auth.len(), 1);
    let auth = &config.registry_auth[0];
    assert_eq!(auth.address, "registry.example.com");
    assert_eq!(auth.username.as_deref(), Some("ci-bot"));
    assert_eq!(auth.password.as_deref(), Some("hunter2"));
}

#[test]
#[serial]
fn explicit_credentials_beat_env() {
    std::env::set_var("DOCKER_REGISTRY_USER", "ci-bot");
    let config = ProviderConfig::from_config(json!({
        "registry_auth": [{ "address": "quay.io", "username": "me" }],
    }))
    .unwrap();
    std::env::remove_var("DOCKER_REGISTRY_USER");

    assert_eq!(config.registry_auth[0].username.as_deref(), Some("me"));
}

#[yare::parameterized(
    null  = { Value::Null },
    empty = { json!({}) },
    unset = { json!({ "registry_auth": null }) },
)]
fn empty_config_has_no_registries(raw: Value) {
    assert_eq!(ProviderConfig::from_config(raw).unwrap(), ProviderConfig::default());
}

#[test]
fn registry_without_address_is_rejected() {
    let err = ProviderConfig::from_config(json!({ "registry_auth": [{ "username": "me" }] })).unwrap_err();
    let diags = err.into_diagnostics();
    assert!(has_errors(&diags));
    assert!(diags[0].summary.contains("address"), "{diags:?}");
}

#[test]
fn password_is_redacted_in_debug() {
    let config = ProviderConfig {
        registry_auth: vec![RegistryAuth::new("quay.io").username("me").password("hunter2")],
    };
    assert!(!format!("{config:?}").contains("hunter2"));
}

#[tokio::test]
async fn schema_lists_container_resource() {
    let (_, provider) = provider();
    let Response::Schema { provider: schema, resources } = provider.handle(Request::GetSchema).await else {
        panic!("expected a schema response");
    };
    assert!(schema["block"]["attributes"]["registry_auth"].is_object());
    assert_eq!(schema["block"]["attributes"]["registry_auth"]["kind"]["set"]["block"]["attributes"]["password"]["sensitive"], true);
    assert_eq!(resources.keys().collect::<Vec<_>>(), vec![CONTAINER_RESOURCE]);
}

#[tokio::test]
async fn configure_stores_credentials_for_later_pulls() {
    let (fake, provider) = provider();
    let configured = provider
        .handle(Request::ConfigureProvider {
            config: json!({ "registry_auth": [{ "address": "docker.io", "username": "hub", "password": "pw" }] }),
        })
        .await;
    assert!(configured.diags().is_empty());
    assert_eq!(provider.config().registry_auth.len(), 1);

    let plan = provider
        .handle(Request::PlanResourceChange {
            type_name: CONTAINER_RESOURCE.to_string(),
            prior_state: None,
            proposed_new_state: Some(web_attributes()),
        })
        .await;
    let Response::Plan { planned_state, .. } = plan else { panic!("expected a plan") };

    let applied = provider
        .handle(Request::ApplyResourceChange {
            type_name: CONTAINER_RESOURCE.to_string(),
            prior_state: None,
            planned_state,
        })
        .await;
    assert!(applied.diags().is_empty(), "{:?}", applied.diags());
    assert_eq!(
        fake.calls()[1],
        EngineCall::Pull { image: "nginx:latest".to_string(), username: Some("hub".to_string()) }
    );
}

#[tokio::test]
async fn unknown_resource_type_is_a_diagnostic() {
    let (_, provider) = provider();
    let response = provider
        .handle(Request::ValidateResourceConfig { type_name: "podman_network".to_string(), config: json!({}) })
        .await;
    assert_eq!(response.diags()[0].summary, "unknown resource type \"podman_network\"");
}

#[tokio::test]
async fn apply_routes_by_state_presence() {
    let (fake, provider) = provider();
    let planned = |state: Value| Request::ApplyResourceChange {
        type_name: CONTAINER_RESOURCE.to_string(),
        prior_state: None,
        planned_state: Some(state),
    };

    let mut state = web_attributes();
    state["id"] = Value::Null;
    let Response::Apply { new_state: Some(created), .. } = provider.handle(planned(state)).await else {
        panic!("create should return state");
    };
    assert_eq!(fake.container_ids(), vec!["fake-0001".to_string()]);

    let deleted = provider
        .handle(Request::ApplyResourceChange {
            type_name: CONTAINER_RESOURCE.to_string(),
            prior_state: Some(created),
            planned_state: None,
        })
        .await;
    assert!(matches!(deleted, Response::Apply { new_state: None, .. }));
    assert!(fake.container_ids().is_empty());
}

#[tokio::test]
async fn read_reports_drift() {
    let (fake, provider) = provider();
    fake.insert_container("abc123", Default::default());
    let mut state = web_attributes();
    state["id"] = json!("abc123");

    let read = |state: Value| Request::ReadResource {
        type_name: CONTAINER_RESOURCE.to_string(),
        current_state: state,
    };
    let found = provider.handle(read(state.clone())).await;
    assert!(matches!(found, Response::Read { new_state: Some(_), .. }));

    fake.forget_container("abc123");
    let gone = provider.handle(read(state)).await;
    assert!(matches!(gone, Response::Read { new_state: None, .. }));
}

#[tokio::test]
async fn stop_cancels_later_operations() {
    let (fake, provider) = provider();
    assert_eq!(provider.handle(Request::StopProvider).await, Response::Stopped);
    assert!(provider.stop_token().is_cancelled());

    let mut state = web_attributes();
    state["id"] = Value::Null;
    let applied = provider
        .handle(Request::ApplyResourceChange {
            type_name: CONTAINER_RESOURCE.to_string(),
            prior_state: None,
            planned_state: Some(state),
        })
        .await;
    assert_eq!(applied.diags()[0].summary, "connect cancelled");
    assert!(fake.container_ids().is_empty());
}
