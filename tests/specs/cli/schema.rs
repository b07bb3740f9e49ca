//! `schema` prints the provider and resource schemas without an engine.

use crate::prelude::*;

#[test]
fn schema_lists_container_resource() {
    let out = cli().args(&["schema"]).passes();
    let json = out.stdout_json();

    assert_eq!(json["type"], "Schema");
    let attrs = &json["resources"]["podman_container"]["block"]["attributes"];
    assert_eq!(attrs["image"]["required"], true);
    assert_eq!(attrs["image"]["force_new"], true);
    assert_eq!(attrs["id"]["computed"], true);
    assert_eq!(attrs["restart"]["force_new"], false);
}

#[test]
fn schema_marks_registry_password_sensitive() {
    let json = cli().args(&["schema"]).passes().stdout_json();
    let auth = &json["provider"]["block"]["attributes"]["registry_auth"];
    assert_eq!(auth["kind"]["set"]["block"]["attributes"]["password"]["sensitive"], true);
}
