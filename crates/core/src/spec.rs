// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container Specification: the engine-facing request built from a
//! [`ContainerAttributes`] value.
//!
//! A specification is built once per create and handed to the engine.
//! Translation runs before any engine call, so every [`ValidationError`]
//! surfaces without touching the socket.

use crate::attrs::{
    ContainerAttributes, HealthcheckAttr, MountAttr, MountKind, Propagation, RestartPolicy,
};
use crate::coerce;
use crate::duration::parse_duration_nanos;
use crate::error::{SpecError, ValidationError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

const MIB: i64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    pub container_port: u16,
    /// `0` lets the engine pick a host port.
    pub host_port: u16,
    pub protocol: String,
    pub host_ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedVolume {
    pub name: String,
    pub dest: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDriverSpec {
    pub no_copy: bool,
    pub labels: BTreeMap<String, String>,
    pub driver_name: Option<String>,
    pub driver_options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TmpfsSpec {
    pub size_bytes: Option<i64>,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountSpec {
    pub target: String,
    pub source: Option<String>,
    pub kind: MountKind,
    pub read_only: bool,
    pub propagation: Option<Propagation>,
    pub volume: Option<VolumeDriverSpec>,
    pub tmpfs: Option<TmpfsSpec>,
}

/// Health check with durations in nanoseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthConfig {
    pub test: Vec<String>,
    pub interval_ns: i64,
    pub timeout_ns: i64,
    pub start_period_ns: i64,
    pub retries: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogConfig {
    pub driver: Option<String>,
    pub options: BTreeMap<String, String>,
}

/// Namespace mode for network, PID, user or IPC isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Namespace {
    Host,
    Private,
    /// Join the namespace of another container.
    Container(String),
    /// Engine-specific mode passed through as written.
    Other(String),
}

impl Namespace {
    pub fn parse(mode: &str) -> Self {
        match mode {
            "host" => Namespace::Host,
            "private" => Namespace::Private,
            _ => match mode.strip_prefix("container:") {
                Some(id) => Namespace::Container(id.to_string()),
                None => Namespace::Other(mode.to_string()),
            },
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Host => f.write_str("host"),
            Namespace::Private => f.write_str("private"),
            Namespace::Container(id) => write!(f, "container:{id}"),
            Namespace::Other(mode) => f.write_str(mode),
        }
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Set by the engine facade on submission.
    pub terminal: bool,
    pub user: Option<String>,
    pub working_dir: Option<String>,
    pub entrypoint: Vec<String>,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub port_mappings: Vec<PortMapping>,
    pub publish_exposed_ports: bool,
    pub volumes: Vec<NamedVolume>,
    pub volumes_from: Vec<String>,
    pub mounts: Vec<MountSpec>,
    pub health: Option<HealthConfig>,
    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    pub dns_servers: Vec<IpAddr>,
    pub dns_options: Vec<String>,
    pub dns_search: Vec<String>,
    pub host_add: Vec<String>,
    pub groups: Vec<String>,
    pub sysctls: BTreeMap<String, String>,
    pub log: LogConfig,
    pub shm_size_bytes: Option<i64>,
    pub net_ns: Option<Namespace>,
    pub pid_ns: Option<Namespace>,
    pub user_ns: Option<Namespace>,
    pub ipc_ns: Option<Namespace>,
    pub privileged: bool,
    pub read_only_rootfs: bool,
    pub remove: bool,
    pub restart: RestartPolicy,
    pub restart_retries: Option<u32>,
}

impl ContainerSpec {
    /// Decode raw attributes and translate them in one step.
    pub fn from_value(value: Value) -> Result<Self, SpecError> {
        let attrs = ContainerAttributes::decode(value)?;
        Self::from_attributes(&attrs)
    }

    pub fn from_attributes(attrs: &ContainerAttributes) -> Result<Self, SpecError> {
        let command = coerce::optional_strings(&attrs.command);
        if command.iter().any(String::is_empty) {
            return Err(ValidationError::EmptyCommandArg.into());
        }

        let (volumes, volumes_from) = coerce::named_volumes(&attrs.volumes).map_err(SpecError::Volumes)?;

        // Only the first capabilities block counts.
        let (cap_add, cap_drop) = attrs
            .capabilities
            .first()
            .map(|c| (coerce::string_set(&c.add), coerce::string_set(&c.drop)))
            .unwrap_or_default();

        let mounts = attrs.mounts.iter().map(mount_spec).collect::<Result<Vec<_>, _>>()?;
        let health = attrs.healthcheck.first().map(health_config).transpose()?;

        let shm_size_bytes = attrs
            .shm_size
            .map(|mib| {
                if mib < 0 {
                    return Err(ValidationError::Negative { field: "shm_size" });
                }
                mib.checked_mul(MIB).ok_or(ValidationError::OutOfRange { field: "shm_size" })
            })
            .transpose()?;

        let restart_retries = attrs
            .max_retry_count
            .map(|n| match u32::try_from(n) {
                Ok(n) => Ok(n),
                Err(_) if n < 0 => Err(ValidationError::Negative { field: "max_retry_count" }),
                Err(_) => Err(ValidationError::OutOfRange { field: "max_retry_count" }),
            })
            .transpose()?;

        Ok(ContainerSpec {
            name: attrs.name.clone(),
            image: attrs.image.clone(),
            terminal: false,
            user: non_empty(&attrs.user),
            working_dir: non_empty(&attrs.working_dir),
            entrypoint: coerce::optional_strings(&attrs.entrypoint),
            command,
            env: coerce::env_map(&attrs.env)?,
            labels: coerce::label_map(&attrs.labels),
            port_mappings: coerce::port_mappings(&attrs.ports),
            publish_exposed_ports: attrs.publish_all_ports,
            volumes,
            volumes_from,
            mounts,
            health,
            cap_add,
            cap_drop,
            dns_servers: coerce::dns_servers(&attrs.dns)?,
            dns_options: coerce::string_set(&attrs.dns_opts),
            dns_search: coerce::string_set(&attrs.dns_search),
            host_add: coerce::string_set(&attrs.host),
            groups: coerce::string_set(&attrs.group_add),
            sysctls: coerce::string_map(&attrs.sysctls)?,
            log: LogConfig {
                driver: non_empty(&attrs.log_driver),
                options: coerce::string_map(&attrs.log_opts)?,
            },
            shm_size_bytes,
            net_ns: namespace(&attrs.network_mode),
            pid_ns: namespace(&attrs.pid_mode),
            user_ns: namespace(&attrs.userns_mode),
            ipc_ns: namespace(&attrs.ipc_mode),
            privileged: attrs.privileged,
            read_only_rootfs: attrs.read_only,
            remove: attrs.rm,
            restart: attrs.restart,
            restart_retries,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value_str(value).map(String::from)
}

fn namespace(mode: &Option<String>) -> Option<Namespace> {
    value_str(mode).map(Namespace::parse)
}

fn value_str(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn mount_spec(mount: &MountAttr) -> Result<MountSpec, ValidationError> {
    let propagation = match mount.kind {
        MountKind::Bind => mount.bind_options.first().and_then(|b| b.propagation),
        _ => None,
    };

    let volume = match (mount.kind, mount.volume_options.first()) {
        (MountKind::Volume, Some(opts)) => Some(VolumeDriverSpec {
            no_copy: opts.no_copy,
            labels: coerce::label_map(&opts.labels),
            driver_name: non_empty(&opts.driver_name),
            driver_options: coerce::string_map(&opts.driver_options)?,
        }),
        _ => None,
    };

    let tmpfs = match (mount.kind, mount.tmpfs_options.first()) {
        (MountKind::Tmpfs, Some(opts)) => {
            if opts.size_bytes.is_some_and(|s| s < 0) {
                return Err(ValidationError::Negative { field: "tmpfs_options.size_bytes" });
            }
            let mode = opts
                .mode
                .map(|m| u32::try_from(m).map_err(|_| ValidationError::OutOfRange { field: "tmpfs_options.mode" }))
                .transpose()?;
            Some(TmpfsSpec { size_bytes: opts.size_bytes, mode })
        }
        _ => None,
    };

    Ok(MountSpec {
        target: mount.target.clone(),
        source: non_empty(&mount.source),
        kind: mount.kind,
        read_only: mount.read_only,
        propagation,
        volume,
        tmpfs,
    })
}

fn health_config(check: &HealthcheckAttr) -> Result<HealthConfig, ValidationError> {
    let duration = |field: &'static str, raw: &Option<String>| -> Result<i64, ValidationError> {
        match value_str(raw) {
            None => Ok(0),
            Some(s) => match parse_duration_nanos(s) {
                Ok(ns) if ns < 0 => {
                    Err(ValidationError::InvalidHealthcheck { field, reason: "duration is negative".to_string() })
                }
                Ok(ns) => Ok(ns),
                Err(e) => Err(ValidationError::InvalidHealthcheck { field, reason: e.to_string() }),
            },
        }
    };

    let retries = check.retries.unwrap_or(0);
    if retries < 0 {
        return Err(ValidationError::Negative { field: "healthcheck.retries" });
    }

    Ok(HealthConfig {
        test: coerce::optional_strings(&check.test),
        interval_ns: duration("interval", &check.interval)?,
        timeout_ns: duration("timeout", &check.timeout)?,
        start_period_ns: duration("start_period", &check.start_period)?,
        retries,
    })
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
