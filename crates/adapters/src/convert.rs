// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container Specification to engine request body.
//!
//! Podman's Docker-compatible API takes the classic create body: top-level
//! process settings in `Config`, isolation and mounts in `HostConfig`.

use bollard::container::Config;
use bollard::models::{
    HealthConfig, HostConfig, HostConfigLogConfig, Mount, MountBindOptions,
    MountBindOptionsPropagationEnum, MountTmpfsOptions, MountTypeEnum, MountVolumeOptions,
    MountVolumeOptionsDriverConfig, PortBinding, RestartPolicy, RestartPolicyNameEnum,
};
use std::collections::HashMap;
use tfpod_core::spec::{HealthConfig as SpecHealth, MountSpec};
use tfpod_core::{ContainerSpec, MountKind, Propagation, RestartPolicy as Restart};

pub fn container_config(spec: &ContainerSpec) -> Config<String> {
    let mut exposed_ports = HashMap::new();
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for mapping in &spec.port_mappings {
        let key = format!("{}/{}", mapping.container_port, mapping.protocol);
        exposed_ports.insert(key.clone(), HashMap::new());
        let binding = PortBinding {
            host_ip: Some(mapping.host_ip.clone()),
            host_port: (mapping.host_port != 0).then(|| mapping.host_port.to_string()),
        };
        port_bindings
            .entry(key)
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(binding);
    }

    let host_config = HostConfig {
        port_bindings: non_empty_map(port_bindings),
        publish_all_ports: Some(spec.publish_exposed_ports),
        binds: non_empty(
            spec.volumes
                .iter()
                .map(|v| format!("{}:{}:{}", v.name, v.dest, v.options.join(",")))
                .collect(),
        ),
        volumes_from: non_empty(spec.volumes_from.clone()),
        mounts: non_empty(spec.mounts.iter().map(mount).collect()),
        cap_add: non_empty(spec.cap_add.clone()),
        cap_drop: non_empty(spec.cap_drop.clone()),
        dns: non_empty(spec.dns_servers.iter().map(ToString::to_string).collect()),
        dns_options: non_empty(spec.dns_options.clone()),
        dns_search: non_empty(spec.dns_search.clone()),
        extra_hosts: non_empty(spec.host_add.clone()),
        group_add: non_empty(spec.groups.clone()),
        sysctls: non_empty_map(spec.sysctls.clone().into_iter().collect()),
        log_config: log_config(spec),
        shm_size: spec.shm_size_bytes,
        network_mode: spec.net_ns.as_ref().map(ToString::to_string),
        pid_mode: spec.pid_ns.as_ref().map(ToString::to_string),
        userns_mode: spec.user_ns.as_ref().map(ToString::to_string),
        ipc_mode: spec.ipc_ns.as_ref().map(ToString::to_string),
        privileged: Some(spec.privileged),
        readonly_rootfs: Some(spec.read_only_rootfs),
        auto_remove: Some(spec.remove),
        restart_policy: Some(restart_policy(spec.restart, spec.restart_retries)),
        ..Default::default()
    };

    Config {
        image: Some(spec.image.clone()),
        tty: Some(spec.terminal),
        user: spec.user.clone(),
        working_dir: spec.working_dir.clone(),
        entrypoint: non_empty(spec.entrypoint.clone()),
        cmd: non_empty(spec.command.clone()),
        env: non_empty(spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect()),
        labels: non_empty_map(spec.labels.clone().into_iter().collect()),
        exposed_ports: non_empty_map(exposed_ports),
        healthcheck: spec.health.as_ref().map(health),
        host_config: Some(host_config),
        ..Default::default()
    }
}

fn restart_policy(policy: Restart, retries: Option<u32>) -> RestartPolicy {
    let name = match policy {
        Restart::No => RestartPolicyNameEnum::NO,
        Restart::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
        Restart::Always => RestartPolicyNameEnum::ALWAYS,
        Restart::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
    };
    RestartPolicy {
        name: Some(name),
        // The engine only honours a retry count for on-failure.
        maximum_retry_count: match policy {
            Restart::OnFailure => retries.map(i64::from),
            _ => None,
        },
    }
}

fn mount(spec: &MountSpec) -> Mount {
    Mount {
        target: Some(spec.target.clone()),
        source: spec.source.clone(),
        typ: Some(match spec.kind {
            MountKind::Bind => MountTypeEnum::BIND,
            MountKind::Volume => MountTypeEnum::VOLUME,
            MountKind::Tmpfs => MountTypeEnum::TMPFS,
        }),
        read_only: Some(spec.read_only),
        bind_options: spec.propagation.map(|p| MountBindOptions {
            propagation: Some(propagation(p)),
            ..Default::default()
        }),
        volume_options: spec.volume.as_ref().map(|v| MountVolumeOptions {
            no_copy: Some(v.no_copy),
            labels: non_empty_map(v.labels.clone().into_iter().collect()),
            driver_config: v.driver_name.as_ref().map(|name| MountVolumeOptionsDriverConfig {
                name: Some(name.clone()),
                options: non_empty_map(v.driver_options.clone().into_iter().collect()),
            }),
            ..Default::default()
        }),
        tmpfs_options: spec.tmpfs.as_ref().map(|t| MountTmpfsOptions {
            size_bytes: t.size_bytes,
            mode: t.mode.map(i64::from),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn propagation(p: Propagation) -> MountBindOptionsPropagationEnum {
    match p {
        Propagation::Private => MountBindOptionsPropagationEnum::PRIVATE,
        Propagation::Rprivate => MountBindOptionsPropagationEnum::RPRIVATE,
        Propagation::Shared => MountBindOptionsPropagationEnum::SHARED,
        Propagation::Rshared => MountBindOptionsPropagationEnum::RSHARED,
        Propagation::Slave => MountBindOptionsPropagationEnum::SLAVE,
        Propagation::Rslave => MountBindOptionsPropagationEnum::RSLAVE,
    }
}

fn health(check: &SpecHealth) -> HealthConfig {
    HealthConfig {
        test: non_empty(check.test.clone()),
        interval: Some(check.interval_ns),
        timeout: Some(check.timeout_ns),
        start_period: Some(check.start_period_ns),
        retries: Some(check.retries),
        ..Default::default()
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// Options without a driver still reach the engine's default driver.
fn log_config(spec: &ContainerSpec) -> Option<HostConfigLogConfig> {
    if spec.log.driver.is_none() && spec.log.options.is_empty() {
        return None;
    }
    Some(HostConfigLogConfig {
        typ: spec.log.driver.clone(),
        config: non_empty_map(spec.log.options.clone().into_iter().collect()),
    })
}

fn non_empty_map<K, V>(map: HashMap<K, V>) -> Option<HashMap<K, V>> {
    (!map.is_empty()).then_some(map)
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
