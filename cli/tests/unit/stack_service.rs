//! Compose stack lifecycle: restart sequence, teardown, status and logs.

#![allow(clippy::expect_used)]

use std::time::Duration;

use n8n_deploy_cli::application::services::stack::{
    LogsOptions, UP_TIMEOUT, UpOptions, down, logs, status, up,
};
use n8n_deploy_cli::domain::DeployError;
use tokio::time::Instant;

use crate::helpers::{err_output, ok_output};
use crate::mocks::{RecordingReporter, ScriptedRunner, plugin_project};

const PREFIX: &str = "docker compose -f /srv/n8n/docker-compose.yml --project-directory /srv/n8n";

fn opts() -> UpOptions {
    UpOptions { settle: Duration::from_secs(10), log_tail: 20 }
}

fn subcommands(runner: &ScriptedRunner) -> Vec<String> {
    runner
        .calls()
        .into_iter()
        .map(|c| c.strip_prefix(PREFIX).unwrap_or(&c).trim().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn up_runs_down_up_ps_logs_in_order() {
    let runner = ScriptedRunner::new(|_, args| {
        if args.contains(&"ps") {
            Ok(ok_output(b"NAME  STATUS\nn8n   Up\n"))
        } else {
            Ok(ok_output(b""))
        }
    });
    let start = Instant::now();

    let report = up(&runner, &plugin_project(), opts(), &RecordingReporter::default())
        .await
        .expect("stack started");

    assert_eq!(
        subcommands(&runner),
        vec!["down", "up -d", "ps", "logs --tail 20"]
    );
    assert!(report.torn_down);
    assert_eq!(report.ps.as_deref(), Some("NAME  STATUS\nn8n   Up\n"));
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(*runner.timeouts.lock().expect("lock"), vec![UP_TIMEOUT]);
}

#[tokio::test(start_paused = true)]
async fn up_ignores_failing_down() {
    let runner = ScriptedRunner::new(|_, args| {
        if args.contains(&"down") {
            Ok(err_output(1, b"no such project"))
        } else {
            Ok(ok_output(b""))
        }
    });
    let reporter = RecordingReporter::default();

    let report = up(&runner, &plugin_project(), opts(), &reporter)
        .await
        .expect("down failure is ignored");

    assert!(!report.torn_down);
    assert_eq!(
        reporter.warnings(),
        vec!["compose down failed (ignored): no such project".to_string()]
    );
    assert!(subcommands(&runner).contains(&"up -d".to_string()));
}

#[tokio::test(start_paused = true)]
async fn up_failure_is_an_error_and_skips_inspection() {
    let runner = ScriptedRunner::new(|_, args| {
        if args.contains(&"up") {
            Ok(err_output(1, b"port is already allocated\n"))
        } else {
            Ok(ok_output(b""))
        }
    });

    let err = up(&runner, &plugin_project(), opts(), &RecordingReporter::default())
        .await
        .expect_err("up failed");

    assert_eq!(
        err.downcast_ref::<DeployError>(),
        Some(&DeployError::ComposeFailed {
            action: "up".to_string(),
            stderr: "port is already allocated".to_string(),
        })
    );
    assert_eq!(subcommands(&runner), vec!["down", "up -d"]);
}

#[tokio::test(start_paused = true)]
async fn zero_settle_does_not_wait() {
    let runner = ScriptedRunner::all_ok();
    let start = Instant::now();

    up(
        &runner,
        &plugin_project(),
        UpOptions { settle: Duration::ZERO, log_tail: 5 },
        &RecordingReporter::default(),
    )
    .await
    .expect("stack started");

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(subcommands(&runner).contains(&"logs --tail 5".to_string()));
}

#[tokio::test]
async fn down_failure_is_an_error() {
    let runner = ScriptedRunner::new(|_, _| Ok(err_output(1, b"permission denied")));

    let err = down(&runner, &plugin_project(), &RecordingReporter::default())
        .await
        .expect_err("down failed");

    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ComposeFailed { action, .. }) if action == "down"
    ));
}

#[tokio::test]
async fn status_parses_ndjson_rows() {
    let runner = ScriptedRunner::new(|_, _| {
        Ok(ok_output(
            br#"{"Service":"n8n","Name":"n8n-n8n-1","State":"running","Health":"healthy","Status":"Up 2 minutes"}
{"Service":"postgres","Name":"n8n-postgres-1","State":"exited","Health":"","Status":"Exited (1)"}
"#,
        ))
    });

    let stack = status(&runner, &plugin_project()).await.expect("status");

    assert_eq!(subcommands(&runner), vec!["ps --all --format json"]);
    assert_eq!(stack.services.len(), 2);
    assert_eq!(stack.services[0].service, "n8n");
    assert!(stack.services[0].is_up());
    assert!(!stack.healthy);
}

#[tokio::test]
async fn status_of_empty_project_is_not_healthy() {
    let runner = ScriptedRunner::new(|_, _| Ok(ok_output(b"")));

    let stack = status(&runner, &plugin_project()).await.expect("status");

    assert!(stack.services.is_empty());
    assert!(!stack.healthy);
}

#[tokio::test]
async fn logs_builds_tail_follow_and_service_args() {
    let runner = ScriptedRunner::all_ok();
    let opts = LogsOptions { tail: Some(50), follow: true, service: Some("n8n".to_string()) };

    logs(&runner, &plugin_project(), &opts).await.expect("logs");

    assert_eq!(subcommands(&runner), vec!["logs --tail 50 --follow n8n"]);
}
