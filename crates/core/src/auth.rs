// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry credentials and matching them to image references.

use serde::{Deserialize, Serialize};
use std::fmt;

const DOCKER_HUB: &str = "docker.io";

/// One `registry_auth` entry from the provider configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    pub address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryAuth")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RegistryAuth {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), username: None, password: None }
    }

    crate::setters! {
        option {
            username: String,
            password: String,
        }
    }

    /// Registry host this entry applies to, without scheme or path.
    pub fn host(&self) -> String {
        normalize_address(&self.address)
    }

    /// Entries with neither username nor password carry no credentials.
    pub fn has_credentials(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.username) || set(&self.password)
    }
}

/// Registry host an image reference would be pulled from.
///
/// The first path component is a registry only if it looks like a host
/// (has a `.` or `:`, or is `localhost`); otherwise the image lives on
/// Docker Hub.
pub fn registry_host(image: &str) -> String {
    match image.split_once('/') {
        Some((first, _)) if first == "localhost" || first.contains('.') || first.contains(':') => {
            normalize_address(first)
        }
        _ => DOCKER_HUB.to_string(),
    }
}

/// Pick the credentials for `image`, if any entry matches its registry.
pub fn auth_for_image<'a>(auths: &'a [RegistryAuth], image: &str) -> Option<&'a RegistryAuth> {
    let host = registry_host(image);
    auths.iter().find(|a| a.has_credentials() && a.host() == host)
}

fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme).to_ascii_lowercase();
    match host.as_str() {
        "index.docker.io" | "registry-1.docker.io" | "registry.hub.docker.com" => DOCKER_HUB.to_string(),
        _ => host,
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
