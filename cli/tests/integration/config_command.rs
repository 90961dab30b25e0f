//! Integration tests for `n8n-deploy config`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn n8n_deploy(config: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("n8n-deploy"));
    cmd.env("NO_COLOR", "1").env("N8N_DEPLOY_CONFIG", config);
    cmd
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("n8n-deploy.yaml");

    n8n_deploy(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("file not found; showing defaults"))
        .stdout(predicate::str::contains("http://localhost:5678/healthz"));
}

#[test]
fn test_config_show_json_is_parseable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("n8n-deploy.yaml");

    let output = n8n_deploy(&config)
        .args(["config", "show", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["health"]["attempts"], 60);
    assert_eq!(v["services"]["app"], "n8n");
}

#[test]
fn test_config_set_persists_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("n8n-deploy.yaml");

    n8n_deploy(&config)
        .args(["config", "set", "health.attempts", "90"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set health.attempts = 90"));

    let written = std::fs::read_to_string(&config).expect("config written");
    assert!(written.contains("attempts: 90"), "{written}");

    let output = n8n_deploy(&config)
        .args(["config", "show", "--json"])
        .output()
        .expect("run");
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["health"]["attempts"], 90);
}

#[test]
fn test_config_set_unknown_key_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("n8n-deploy.yaml");

    n8n_deploy(&config)
        .args(["config", "set", "security.level", "strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: security.level"));
    assert!(!config.exists());
}

#[test]
fn test_config_set_invalid_value_json_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("n8n-deploy.yaml");

    let output = n8n_deploy(&config)
        .args(["config", "set", "health.attempts", "0", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "invalid_config");
}
