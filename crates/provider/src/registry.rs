// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource types by name, built once at startup.

use crate::resource::{ContainerResource, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tfpod_adapters::EngineConnector;

pub const CONTAINER_RESOURCE: &str = "podman_container";

#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every resource type this provider serves, backed by `connector`.
    pub fn podman<C: EngineConnector>(connector: C) -> Self {
        Self::new().with(CONTAINER_RESOURCE, ContainerResource::new(connector))
    }

    pub fn with(mut self, type_name: impl Into<String>, resource: impl Resource + 'static) -> Self {
        self.resources.insert(type_name.into(), Arc::new(resource));
        self
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(type_name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Resource>)> {
        self.resources.iter().map(|(name, resource)| (name.as_str(), resource))
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
