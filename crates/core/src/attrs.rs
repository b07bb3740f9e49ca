// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed Container Attribute Set.
//!
//! The plugin host hands over attributes as a loosely-typed JSON object.
//! [`ContainerAttributes::decode`] is the single step that turns that object
//! into these structs; any shape problem becomes one [`DecodeError`].
//! Collections and flags tolerate explicit `null`, which the host sends for
//! unset optional attributes.

use crate::error::{decode, DecodeError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Deserialize `null` as the type's default.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    #[default]
    No,
    OnFailure,
    Always,
    UnlessStopped,
}

crate::simple_display! {
    RestartPolicy {
        No => "no",
        OnFailure => "on-failure",
        Always => "always",
        UnlessStopped => "unless-stopped",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    Bind,
    Volume,
    Tmpfs,
}

crate::simple_display! {
    MountKind {
        Bind => "bind",
        Volume => "volume",
        Tmpfs => "tmpfs",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    Private,
    Rprivate,
    Shared,
    Rshared,
    Slave,
    Rslave,
}

crate::simple_display! {
    Propagation {
        Private => "private",
        Rprivate => "rprivate",
        Shared => "shared",
        Rshared => "rshared",
        Slave => "slave",
        Rslave => "rslave",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesAttr {
    #[serde(default, deserialize_with = "nullable")]
    pub add: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub drop: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAttr {
    pub label: String,
    pub value: String,
}

impl LabelAttr {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAttr {
    #[serde(default)]
    pub internal: Option<u16>,
    #[serde(default)]
    pub external: Option<u16>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAttr {
    #[serde(default)]
    pub from_container: Option<String>,
    #[serde(default)]
    pub container_path: Option<String>,
    #[serde(default)]
    pub host_path: Option<String>,
    #[serde(default)]
    pub volume_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub read_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOptionsAttr {
    #[serde(default)]
    pub propagation: Option<Propagation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeOptionsAttr {
    #[serde(default, deserialize_with = "nullable")]
    pub no_copy: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<LabelAttr>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub driver_options: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmpfsOptionsAttr {
    #[serde(default)]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub mode: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountAttr {
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub kind: MountKind,
    #[serde(default, deserialize_with = "nullable")]
    pub read_only: bool,
    /// Accepted for compatibility; the engine has no per-mount equivalent.
    #[serde(default, deserialize_with = "nullable")]
    pub rm: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub bind_options: Vec<BindOptionsAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub volume_options: Vec<VolumeOptionsAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub tmpfs_options: Vec<TmpfsOptionsAttr>,
}

impl MountAttr {
    pub fn new(target: impl Into<String>, kind: MountKind) -> Self {
        Self {
            target: target.into(),
            source: None,
            kind,
            read_only: false,
            rm: false,
            bind_options: Vec::new(),
            volume_options: Vec::new(),
            tmpfs_options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckAttr {
    #[serde(default, deserialize_with = "nullable")]
    pub test: Vec<Option<String>>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub start_period: Option<String>,
    #[serde(default)]
    pub retries: Option<i64>,
}

/// The user-authored description of a desired container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerAttributes {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub capabilities: Vec<CapabilitiesAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<LabelAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub entrypoint: Vec<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub command: Vec<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub env: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub mounts: Vec<MountAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub volumes: Vec<VolumeAttr>,
    #[serde(default, deserialize_with = "nullable")]
    pub healthcheck: Vec<HealthcheckAttr>,
    #[serde(default)]
    pub log_driver: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub log_opts: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub privileged: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub publish_all_ports: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub restart: RestartPolicy,
    #[serde(default)]
    pub max_retry_count: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub rm: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub read_only: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub host: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub dns: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub dns_opts: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub dns_search: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<PortAttr>,
    #[serde(default)]
    pub shm_size: Option<i64>,
    #[serde(default)]
    pub network_mode: Option<String>,
    #[serde(default)]
    pub pid_mode: Option<String>,
    #[serde(default)]
    pub userns_mode: Option<String>,
    #[serde(default)]
    pub ipc_mode: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sysctls: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub group_add: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub attach: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub logs: bool,
}

impl ContainerAttributes {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self { name: name.into(), image: image.into(), ..Self::default() }
    }

    /// Decode the raw attribute object sent by the plugin host.
    ///
    /// Unknown keys (computed outputs such as `id`) are ignored; schema
    /// validation reports them separately at plan time.
    pub fn decode(value: Value) -> Result<Self, DecodeError> {
        decode("container attributes", value)
    }
}

#[cfg(test)]
#[path = "attrs_tests.rs"]
mod tests;
