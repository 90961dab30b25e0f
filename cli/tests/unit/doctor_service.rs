//! Deployment diagnostics.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use n8n_deploy_cli::application::services::doctor::run_doctor;
use n8n_deploy_cli::domain::{DeployConfig, collect_issues};

use crate::helpers::err_output;
use crate::mocks::{CountingProbe, MemFs, RecordingReporter, ScriptedRunner, docker_host, empty_host};

const DIR: &str = "/srv/n8n";

fn bundle_present() -> MemFs {
    let paths: Vec<PathBuf> = DeployConfig::default()
        .required_files(Path::new(DIR))
        .into_iter()
        .map(|(_, p)| p)
        .collect();
    MemFs::with_files(paths.iter().map(PathBuf::as_path))
}

#[tokio::test]
async fn healthy_deployment_has_no_issues() {
    let runner = ScriptedRunner::new(docker_host);
    let report = run_doctor(
        &runner,
        &bundle_present(),
        &CountingProbe::ready_on(1),
        &DeployConfig::default(),
        Path::new(DIR),
        &RecordingReporter::default(),
    )
    .await;

    assert_eq!(report.proxy_config_valid, Some(true));
    assert!(report.app_healthy);
    assert!(collect_issues(&report).is_empty(), "{:?}", collect_issues(&report));
    assert_eq!(runner.calls_containing("run --rm --no-deps nginx nginx -t").len(), 1);
}

#[tokio::test]
async fn invalid_proxy_config_is_reported() {
    let runner = ScriptedRunner::new(|program, args| {
        if args.contains(&"nginx") {
            Ok(err_output(1, b"nginx: [emerg] unknown directive \"proxy_passs\"\n"))
        } else {
            docker_host(program, args)
        }
    });
    let report = run_doctor(
        &runner,
        &bundle_present(),
        &CountingProbe::ready_on(1),
        &DeployConfig::default(),
        Path::new(DIR),
        &RecordingReporter::default(),
    )
    .await;

    assert_eq!(report.proxy_config_valid, Some(false));
    assert!(
        report
            .proxy_config_error
            .as_deref()
            .is_some_and(|e| e.contains("unknown directive"))
    );
    assert_eq!(collect_issues(&report), vec!["reverse proxy configuration is invalid".to_string()]);
}

#[tokio::test]
async fn bare_host_lists_root_causes_only() {
    let runner = ScriptedRunner::new(empty_host);
    let report = run_doctor(
        &runner,
        &MemFs::default(),
        &CountingProbe::never(),
        &DeployConfig::default(),
        Path::new(DIR),
        &RecordingReporter::default(),
    )
    .await;

    assert_eq!(report.proxy_config_valid, None);
    let issues = collect_issues(&report);
    assert_eq!(issues.len(), 5, "{issues:?}");
    assert_eq!(issues[0], "docker is not installed");
    assert_eq!(issues[1], "docker compose is not installed");
    assert_eq!(issues[2], "compose file missing: /srv/n8n/docker-compose.yml");
    assert!(!issues.iter().any(|i| i.contains("health endpoint")));
}

#[tokio::test]
async fn stopped_stack_reports_health_endpoint() {
    let runner = ScriptedRunner::new(docker_host);
    let report = run_doctor(
        &runner,
        &bundle_present(),
        &CountingProbe::never(),
        &DeployConfig::default(),
        Path::new(DIR),
        &RecordingReporter::default(),
    )
    .await;

    assert_eq!(collect_issues(&report), vec!["n8n health endpoint is not responding".to_string()]);
}
