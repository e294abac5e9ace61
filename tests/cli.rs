//! Integration tests for the lokoctl CLI.
//!
//! These tests run the compiled binary and verify its output. None of them
//! reach an external engine: every scenario fails or finishes during
//! configuration resolution.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get lokoctl command for testing, isolated from the caller's environment.
fn lokoctl() -> Command {
    let mut cmd = cargo_bin_cmd!("lokoctl");
    cmd.env_remove("LOKOCTL_CONFIG");
    cmd.env_remove("LOKOCTL_KUBECONFIG");
    cmd.env_remove("PACKET_AUTH_TOKEN");
    cmd
}

/// Get lokoctl command with `cluster.yaml` written into a temp directory.
fn lokoctl_with_config(temp: &assert_fs::TempDir, config: &str) -> Command {
    temp.child("cluster.yaml").write_str(config).unwrap();
    let mut cmd = lokoctl();
    cmd.current_dir(temp.path());
    cmd
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn cli_no_args_shows_help() {
    lokoctl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn cli_help_flag_shows_help() {
    lokoctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Lokomotive - provision and maintain Kubernetes clusters",
        ));
}

#[test]
fn cli_version_flag_shows_version() {
    lokoctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lokoctl"));
}

#[test]
fn cluster_apply_help_shows_options() {
    lokoctl()
        .args(["cluster", "apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-components"))
        .stdout(predicate::str::contains("--upgrade-kubelets"))
        .stdout(predicate::str::contains("--confirm"));
}

// ============================================================================
// Extensions and completions
// ============================================================================

#[test]
fn extensions_lists_builtin_names() {
    lokoctl()
        .arg("extensions")
        .assert()
        .success()
        .stdout(predicate::str::contains("packet"))
        .stdout(predicate::str::contains("bare-metal"))
        .stdout(predicate::str::contains("cert-manager"));
}

#[test]
fn extensions_json_format() {
    let output = lokoctl()
        .args(["extensions", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(catalog["backend"], serde_json::json!(["local", "s3"]));
    assert_eq!(catalog["component"], serde_json::json!(["cert-manager", "contour"]));
}

#[test]
fn completions_bash() {
    lokoctl()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lokoctl"));
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn cluster_apply_missing_config_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    lokoctl()
        .current_dir(temp.path())
        .args(["cluster", "apply", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cluster.yaml"));
}

#[test]
fn config_path_from_environment() {
    let temp = assert_fs::TempDir::new().unwrap();
    lokoctl()
        .current_dir(temp.path())
        .env("LOKOCTL_CONFIG", "elsewhere.yaml")
        .args(["cluster", "destroy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("elsewhere.yaml"));
}

#[test]
fn cluster_apply_without_platform_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    lokoctl_with_config(&temp, "backend:\n  name: local\n")
        .args(["cluster", "apply", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no platform configured"));
}

#[test]
fn cluster_apply_unknown_platform_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    lokoctl_with_config(&temp, "cluster:\n  name: aws\n")
        .args(["cluster", "apply", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no platform with name 'aws' found"));
}

#[test]
fn cluster_apply_reports_duplicate_worker_pools() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = r#"
cluster:
  name: packet
  config:
    cluster_name: demo
    asset_dir: ./assets
    project_id: p-123
    facility: ams1
    ssh_pubkeys: ["ssh-ed25519 AAAA"]
    dns:
      zone: example.com
      provider:
        manual: {}
    worker_pools:
      - name: general
        count: 1
      - name: general
        count: 2
network:
  config: null
"#;
    lokoctl_with_config(&temp, config)
        .args(["cluster", "apply", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Worker pool \"general\" is duplicated"));
    temp.child("assets").assert(predicate::path::missing());
}

#[test]
fn cluster_apply_without_network_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = r#"
cluster:
  name: bare-metal
  config:
    cluster_name: rack
    asset_dir: ./assets
    k8s_domain_name: k8s.example.com
    ssh_pubkeys: ["ssh-ed25519 AAAA"]
    matchbox_endpoint: matchbox.example.com:8081
    matchbox_http_endpoint: http://matchbox.example.com:8080
    matchbox_ca_path: ./ca.crt
    matchbox_client_cert_path: ./client.crt
    matchbox_client_key_path: ./client.key
    controller_names: [node1]
    controller_macs: ["52:54:00:a1:9c:ae"]
    controller_domains: [node1.example.com]
"#;
    lokoctl_with_config(&temp, config)
        .args(["cluster", "apply", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network not configured"));
}

#[test]
fn component_apply_unknown_component_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = r#"
cluster:
  name: packet
  config:
    cluster_name: demo
    asset_dir: ./assets
    project_id: p-123
    facility: ams1
    ssh_pubkeys: ["ssh-ed25519 AAAA"]
    dns:
      zone: example.com
      provider:
        manual: {}
    worker_pools:
      - name: general
        count: 1
network:
  config: null
components:
  - name: contour
    config:
      install_mode: deployment
"#;
    lokoctl_with_config(&temp, config)
        .args(["component", "apply", "cert-manager"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cert-manager"))
        .stderr(predicate::str::contains("contour"));
}
