//! `plan` prints the container specification each resource would create.

use crate::prelude::*;

#[test]
fn plan_translates_ports_and_defaults() {
    let project = Project::empty();
    project.file(
        "main.tf",
        r#"
resource "podman_container" "web" {
  name  = "web"
  image = "nginx:latest"
  env   = ["A=1", "B=x=y"]

  ports {
    internal = 80
    external = 8080
  }
}
"#,
    );

    let json = project.provider("plan", "main.tf").passes().stdout_json();
    let web = &json["podman_container.web"];

    assert_eq!(web["image"], "nginx:latest");
    assert_eq!(web["port_mappings"][0]["container_port"], 80);
    assert_eq!(web["port_mappings"][0]["host_port"], 8080);
    assert_eq!(web["port_mappings"][0]["host_ip"], "0.0.0.0");
    assert_eq!(web["env"]["B"], "x=y");
}

#[test]
fn plan_never_needs_an_engine() {
    let project = Project::empty();
    project.file("main.tf", "resource \"podman_container\" \"a\" {\n  name  = \"a\"\n  image = \"alpine\"\n}\n");

    project
        .provider("plan", "main.tf")
        .env("TF_PODMAN_SOCKET", "/nonexistent/podman.sock")
        .passes()
        .stdout_has("podman_container.a");
}

#[test]
fn conflicting_volume_sources_fail_the_plan() {
    let project = Project::empty();
    project.file(
        "main.tf",
        r#"
resource "podman_container" "vol" {
  name  = "vol"
  image = "alpine"
  volumes {
    from_container = "other"
    container_path = "/data"
  }
}
"#,
    );

    project
        .provider("plan", "main.tf")
        .fails()
        .stdout_has("Unable to parse volumes: Both a container and a path specified in a volume entry");
}
