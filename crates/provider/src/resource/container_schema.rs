// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema of the `podman_container` resource.
//!
//! Every attribute forces replacement except `mounts`, `healthcheck`,
//! `restart` and `max_retry_count`.

use tfpod_core::{Attribute, Block, Kind, Schema, Validator};

const MOUNT_TYPE_PATTERN: &str = r"^(bind|volume|tmpfs)$";
const PROPAGATION_PATTERN: &str = r"^(private|rprivate|shared|rshared|slave|rslave)$";
const RESTART_PATTERN: &str = r"^(no|on-failure|always|unless-stopped)$";

fn string_set() -> Attribute {
    Attribute::set_of(Kind::String)
}

fn label_block() -> Block {
    Block::new()
        .attr("label", Attribute::string().required().describe("Name of the label"))
        .attr("value", Attribute::string().required().describe("Value of the label"))
}

fn capabilities_block() -> Block {
    Block::new()
        .attr("add", string_set().optional().force_new())
        .attr("drop", string_set().optional().force_new())
}

fn mount_block() -> Block {
    let bind_options = Block::new().attr(
        "propagation",
        Attribute::string()
            .optional()
            .validate(Validator::Pattern(PROPAGATION_PATTERN))
            .describe("A propagation mode with the value"),
    );
    let volume_options = Block::new()
        .attr(
            "no_copy",
            Attribute::bool().optional().describe("Populate volume with data from the target"),
        )
        .attr(
            "labels",
            Attribute::set_of_blocks(label_block())
                .optional()
                .describe("User-defined key/value metadata"),
        )
        .attr(
            "driver_name",
            Attribute::string()
                .optional()
                .describe("Name of the driver to use to create the volume"),
        )
        .attr(
            "driver_options",
            Attribute::map_of(Kind::String)
                .optional()
                .describe("key/value map of driver specific options"),
        );
    let tmpfs_options = Block::new()
        .attr(
            "size_bytes",
            Attribute::int().optional().describe("The size for the tmpfs mount in bytes"),
        )
        .attr(
            "mode",
            Attribute::int()
                .optional()
                .describe("The permission mode for the tmpfs mount in an integer"),
        );

    Block::new()
        .attr("target", Attribute::string().required().describe("Container path"))
        .attr(
            "source",
            Attribute::string()
                .optional()
                .describe("Mount source (e.g. a volume name, a host path)"),
        )
        .attr(
            "type",
            Attribute::string()
                .required()
                .validate(Validator::Pattern(MOUNT_TYPE_PATTERN))
                .describe("The mount type"),
        )
        .attr("rm", Attribute::bool().optional().default(false))
        .attr(
            "read_only",
            Attribute::bool().optional().describe("Whether the mount should be read-only"),
        )
        .attr(
            "bind_options",
            Attribute::list_of_blocks(bind_options)
                .optional()
                .max_items(1)
                .describe("Optional configuration for the bind type"),
        )
        .attr(
            "volume_options",
            Attribute::list_of_blocks(volume_options)
                .optional()
                .max_items(1)
                .describe("Optional configuration for the volume type"),
        )
        .attr(
            "tmpfs_options",
            Attribute::list_of_blocks(tmpfs_options)
                .optional()
                .force_new()
                .max_items(1)
                .describe("Optional configuration for the tmpfs type"),
        )
}

fn volume_block() -> Block {
    Block::new()
        .attr("from_container", Attribute::string().optional().force_new())
        .attr("container_path", Attribute::string().optional().force_new())
        .attr(
            "host_path",
            Attribute::string().optional().force_new().validate(Validator::AbsolutePath),
        )
        .attr("volume_name", Attribute::string().optional().force_new())
        .attr("read_only", Attribute::bool().optional().force_new())
}

fn duration(description: &'static str) -> Attribute {
    Attribute::string()
        .optional()
        .default("0s")
        .validate(Validator::NonNegativeDuration)
        .describe(description)
}

fn healthcheck_block() -> Block {
    Block::new()
        .attr(
            "test",
            Attribute::list_of(Kind::String).required().describe("The test to perform as list"),
        )
        .attr("interval", duration("Time between running the check (ms|s|m|h)"))
        .attr("timeout", duration("Maximum time to allow one check to run (ms|s|m|h)"))
        .attr(
            "start_period",
            duration(
                "Start period for the container to initialize before counting retries towards unstable (ms|s|m|h)",
            ),
        )
        .attr(
            "retries",
            Attribute::int()
                .optional()
                .default(0)
                .validate(Validator::AtLeast(0))
                .describe("Consecutive failures needed to report unhealthy"),
        )
}

fn port_block() -> Block {
    Block::new()
        .attr("internal", Attribute::int().required().force_new())
        .attr("external", Attribute::int().optional().computed().force_new())
        .attr("ip", Attribute::string().optional().force_new().default("0.0.0.0"))
        .attr("protocol", Attribute::string().optional().force_new().default("tcp"))
}

pub fn container_schema() -> Schema {
    let block = Block::new()
        .attr("id", Attribute::string().computed().describe("Engine-assigned container id"))
        .attr("name", Attribute::string().required().force_new())
        .attr("image", Attribute::string().required().force_new())
        .attr("working_dir", Attribute::string().optional().computed().force_new())
        .attr(
            "capabilities",
            Attribute::set_of_blocks(capabilities_block()).optional().force_new().max_items(1),
        )
        .attr("labels", Attribute::set_of_blocks(label_block()).optional().force_new())
        .attr("entrypoint", Attribute::list_of(Kind::String).optional().computed().force_new())
        .attr("user", Attribute::string().optional().computed().force_new())
        .attr("command", Attribute::list_of(Kind::String).optional().computed().force_new())
        .attr("env", string_set().optional().force_new())
        .attr(
            "mounts",
            Attribute::set_of_blocks(mount_block())
                .optional()
                .describe("Specification for mounts to be added to the container"),
        )
        .attr("volumes", Attribute::set_of_blocks(volume_block()).optional().force_new())
        .attr(
            "healthcheck",
            Attribute::list_of_blocks(healthcheck_block())
                .optional()
                .max_items(1)
                .describe("A test to perform to check that the container is healthy"),
        )
        .attr("log_driver", Attribute::string().optional().computed().force_new())
        .attr("log_opts", Attribute::map_of(Kind::String).optional().computed().force_new())
        .attr("privileged", Attribute::bool().optional().force_new())
        .attr("publish_all_ports", Attribute::bool().optional().force_new())
        .attr(
            "restart",
            Attribute::string()
                .optional()
                .default("no")
                .validate(Validator::Pattern(RESTART_PATTERN)),
        )
        .attr("max_retry_count", Attribute::int().optional())
        .attr(
            "rm",
            Attribute::bool().optional().force_new().describe("Remove the container when it exits"),
        )
        .attr(
            "read_only",
            Attribute::bool()
                .optional()
                .force_new()
                .describe("Mount the root filesystem read-only"),
        )
        .attr(
            "host",
            string_set().optional().force_new().describe("Extra hostname:ip entries for /etc/hosts"),
        )
        .attr("dns", string_set().optional().computed().force_new())
        .attr("dns_opts", string_set().optional().computed().force_new())
        .attr("dns_search", string_set().optional().force_new())
        .attr("ports", Attribute::list_of_blocks(port_block()).optional().force_new())
        .attr(
            "shm_size",
            Attribute::int()
                .optional()
                .computed()
                .force_new()
                .validate(Validator::AtLeast(0))
                .describe("Size of /dev/shm in MiB"),
        )
        .attr(
            "network_mode",
            Attribute::string().optional().force_new().suppress_empty_as("default"),
        )
        .attr("pid_mode", Attribute::string().optional().force_new())
        .attr("userns_mode", Attribute::string().optional().force_new())
        .attr(
            "ipc_mode",
            Attribute::string()
                .optional()
                .computed()
                .force_new()
                .describe("IPC sharing mode for the container"),
        )
        .attr("sysctls", Attribute::map_of(Kind::String).optional().force_new())
        .attr(
            "group_add",
            string_set()
                .optional()
                .force_new()
                .describe("Additional groups for the container user"),
        )
        .attr(
            "attach",
            Attribute::bool()
                .optional()
                .force_new()
                .describe("Wait for the container to exit after creating it"),
        )
        .attr(
            "logs",
            Attribute::bool()
                .optional()
                .force_new()
                .describe("Capture the container's output when attached"),
        )
        .attr(
            "container_logs",
            Attribute::string().computed().describe("Output of an attached container"),
        );
    Schema::v0(block)
}

#[cfg(test)]
#[path = "container_schema_tests.rs"]
mod tests;
