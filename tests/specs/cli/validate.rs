//! `validate` checks a `.tf` file offline.

use crate::prelude::*;

const VALID: &str = r#"
provider "podman" {
  registry_auth {
    address  = "quay.io"
    username = "me"
    password = "secret"
  }
}

resource "podman_container" "web" {
  name  = "web"
  image = "nginx:latest"

  ports {
    internal = 80
    external = 8080
  }

  healthcheck {
    test     = ["CMD", "curl", "-f", "http://localhost"]
    interval = "30s"
    retries  = 3
  }
}
"#;

#[test]
fn valid_file_passes() {
    let project = Project::empty();
    project.file("main.tf", VALID);

    project.provider("validate", "main.tf").passes().stdout_has("main.tf: ok");
}

#[test]
fn invalid_attribute_is_reported_with_address() {
    let project = Project::empty();
    project.file(
        "main.tf",
        r#"
resource "podman_container" "bad" {
  name    = "bad"
  image   = "alpine"
  restart = "sometimes"
}
"#,
    );

    let out = project.provider("validate", "main.tf").fails().stdout_has("podman_container.bad: error:");
    assert_eq!(out.code(), Some(1));
    out.stderr_has("1 error found");
}

#[test]
fn relative_host_path_is_rejected() {
    let project = Project::empty();
    project.file(
        "main.tf",
        r#"
resource "podman_container" "data" {
  name  = "data"
  image = "alpine"
  volumes {
    host_path      = "data"
    container_path = "/data"
  }
}
"#,
    );

    project.provider("validate", "main.tf").fails().stdout_has("podman_container.data");
}

#[test]
fn unsupported_resource_type_fails() {
    let project = Project::empty();
    project.file("main.tf", "resource \"podman_pod\" \"p\" {\n  name = \"p\"\n}\n");

    project.provider("validate", "main.tf").fails().stdout_has("unsupported resource type");
}

#[test]
fn missing_file_fails() {
    let project = Project::empty();
    project.provider("validate", "absent.tf").fails().stderr_has("absent.tf");
}

#[test]
fn syntax_error_fails() {
    let project = Project::empty();
    project.file("main.tf", "resource \"podman_container\" {");

    project.provider("validate", "main.tf").fails();
}
