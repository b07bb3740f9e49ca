//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("serve")
        .stdout_has("schema")
        .stdout_has("validate")
        .stdout_has("plan");
}

#[test]
fn version_is_printed() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn serve_without_socket_location_fails() {
    cli().args(&["serve"]).fails().stderr_has("XDG_RUNTIME_DIR");
}
