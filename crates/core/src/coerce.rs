// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribute coercion utilities.
//!
//! Pure conversions from decoded attribute collections into the shapes the
//! container specification holds. Nothing here touches the engine.

use crate::attrs::{LabelAttr, PortAttr, VolumeAttr};
use crate::error::ValidationError;
use crate::spec::{NamedVolume, PortMapping};
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::IpAddr;

pub const DEFAULT_HOST_IP: &str = "0.0.0.0";
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Set of strings to a sequence, first occurrence wins.
pub fn string_set(values: &[String]) -> Vec<String> {
    values.iter().cloned().collect::<IndexSet<_>>().into_iter().collect()
}

/// Positional list to a sequence; absent slots become `""` so indices line up.
pub fn optional_strings(values: &[Option<String>]) -> Vec<String> {
    values.iter().map(|v| v.clone().unwrap_or_default()).collect()
}

/// Port records to mappings.
///
/// An entry is kept only when it has a non-zero internal port and either an
/// external port or a host IP. Incomplete entries are dropped without error.
pub fn port_mappings(ports: &[PortAttr]) -> Vec<PortMapping> {
    ports
        .iter()
        .filter_map(|port| {
            let container_port = port.internal.filter(|p| *p != 0)?;
            let host_port = port.external.filter(|p| *p != 0);
            if host_port.is_none() && port.ip.is_none() {
                return None;
            }
            Some(PortMapping {
                container_port,
                host_port: host_port.unwrap_or(0),
                protocol: non_empty(port.protocol.as_deref()).unwrap_or(DEFAULT_PROTOCOL).to_string(),
                host_ip: non_empty(port.ip.as_deref()).unwrap_or(DEFAULT_HOST_IP).to_string(),
            })
        })
        .collect()
}

/// Volume records to named volumes plus the containers to copy volumes from.
///
/// Each entry must name exactly one of `from_container` or `container_path`.
/// A missing `volume_name` reuses `host_path` as the volume name. An entry
/// with a container path but neither name is skipped.
pub fn named_volumes(volumes: &[VolumeAttr]) -> Result<(Vec<NamedVolume>, Vec<String>), ValidationError> {
    let mut named = Vec::new();
    let mut from = Vec::new();

    for volume in volumes {
        let from_container = non_empty(volume.from_container.as_deref());
        let container_path = non_empty(volume.container_path.as_deref());
        let name = non_empty(volume.volume_name.as_deref()).or(non_empty(volume.host_path.as_deref()));

        match (from_container, container_path) {
            (None, None) => return Err(ValidationError::VolumeNoSource),
            (Some(_), Some(_)) => return Err(ValidationError::VolumeBothSources),
            (Some(source), None) => from.push(source.to_string()),
            (None, Some(dest)) => {
                if let Some(name) = name {
                    let mode = if volume.read_only { "ro" } else { "rw" };
                    named.push(NamedVolume {
                        name: name.to_string(),
                        dest: dest.to_string(),
                        options: vec![mode.to_string()],
                    });
                }
            }
        }
    }

    Ok((named, from))
}

/// Opaque map to a string map. Numbers and booleans are rendered; anything
/// else is rejected.
pub fn string_map(map: &BTreeMap<String, Value>) -> Result<BTreeMap<String, String>, ValidationError> {
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(ValidationError::NotAString { key: key.clone() }),
            };
            Ok((key.clone(), rendered))
        })
        .collect()
}

/// Label pairs to a map. Later pairs overwrite earlier ones.
pub fn label_map(labels: &[LabelAttr]) -> BTreeMap<String, String> {
    labels.iter().map(|l| (l.label.clone(), l.value.clone())).collect()
}

/// `KEY=VALUE` entries to a map, split on the first `=` and trimmed.
pub fn env_map(entries: &[String]) -> Result<BTreeMap<String, String>, ValidationError> {
    let mut env = BTreeMap::new();
    for entry in string_set(entries) {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(ValidationError::MalformedEnv(entry));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidationError::MalformedEnv(entry));
        }
        env.insert(key.to_string(), value.trim().to_string());
    }
    Ok(env)
}

pub fn dns_servers(entries: &[String]) -> Result<Vec<IpAddr>, ValidationError> {
    string_set(entries)
        .into_iter()
        .map(|s| {
            let parsed: Result<IpAddr, _> = s.trim().parse();
            parsed.map_err(|_| ValidationError::InvalidDnsServer(s))
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "coerce_tests.rs"]
mod tests;
