//! Application service: compose stack lifecycle.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use n8n_deploy_common::{ServiceStatus, StackStatus};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::stack::parse_compose_ps;
use crate::domain::{ComposeProject, DeployError};

/// Timeout for `compose up -d`, which may pull images.
pub const UP_TIMEOUT: Duration = Duration::from_secs(600);

/// Settings for the restart sequence.
#[derive(Debug, Clone, Copy)]
pub struct UpOptions {
    /// Wait after `up -d` before inspecting the stack.
    pub settle: Duration,
    /// Lines of log output shown per service.
    pub log_tail: u32,
}

/// What `up` observed after starting the stack.
#[derive(Debug, Default)]
pub struct UpReport {
    /// Whether the preceding `down` succeeded.
    pub torn_down: bool,
    /// Output of `compose ps`, when it succeeded.
    pub ps: Option<String>,
    /// Output of `compose logs --tail N`, when it succeeded.
    pub logs: Option<String>,
}

async fn compose(
    runner: &impl CommandRunner,
    project: &ComposeProject,
    sub: &[&str],
) -> Result<Output> {
    let args = project.args(sub);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    tracing::debug!(program = project.program(), args = ?refs, "compose");
    runner.run(project.program(), &refs).await
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).trim().to_string()
}

/// Inspection output, or `None` with a warning when the command failed.
fn inspection(result: Result<Output>, what: &str, reporter: &impl ProgressReporter) -> Option<String> {
    match result {
        Ok(out) if out.status.success() => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            Some(text)
        }
        Ok(out) => {
            reporter.warn(&format!("{what} failed: {}", stderr_of(&out)));
            None
        }
        Err(e) => {
            reporter.warn(&format!("{what} failed: {e}"));
            None
        }
    }
}

/// Restart the stack: tear down (ignoring failure), start detached, settle,
/// then capture status and recent logs.
///
/// Prerequisites must already have been checked by the caller.
///
/// # Errors
///
/// Returns [`DeployError::ComposeFailed`] if `up -d` fails.
pub async fn up(
    runner: &impl CommandRunner,
    project: &ComposeProject,
    opts: UpOptions,
    reporter: &impl ProgressReporter,
) -> Result<UpReport> {
    let mut report = UpReport::default();

    reporter.step("stopping existing containers...");
    match compose(runner, project, &["down"]).await {
        Ok(out) if out.status.success() => report.torn_down = true,
        Ok(out) => reporter.warn(&format!("compose down failed (ignored): {}", stderr_of(&out))),
        Err(e) => reporter.warn(&format!("compose down failed (ignored): {e}")),
    }

    reporter.step("starting containers...");
    let args = project.args(&["up", "-d"]);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = runner
        .run_with_timeout(project.program(), &refs, UP_TIMEOUT)
        .await?;
    if !out.status.success() {
        return Err(DeployError::ComposeFailed {
            action: "up".to_string(),
            stderr: stderr_of(&out),
        }
        .into());
    }
    reporter.success("containers started");

    if !opts.settle.is_zero() {
        reporter.step(&format!("waiting {}s for services to settle...", opts.settle.as_secs()));
        tokio::time::sleep(opts.settle).await;
    }

    report.ps = inspection(compose(runner, project, &["ps"]).await, "compose ps", reporter);
    let tail = opts.log_tail.to_string();
    report.logs = inspection(
        compose(runner, project, &["logs", "--tail", &tail]).await,
        "compose logs",
        reporter,
    );
    Ok(report)
}

/// Stop and remove the stack's containers.
///
/// # Errors
///
/// Returns [`DeployError::ComposeFailed`] if `down` fails.
pub async fn down(
    runner: &impl CommandRunner,
    project: &ComposeProject,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step("stopping containers...");
    let out = compose(runner, project, &["down"]).await?;
    if !out.status.success() {
        return Err(DeployError::ComposeFailed {
            action: "down".to_string(),
            stderr: stderr_of(&out),
        }
        .into());
    }
    reporter.success("containers stopped");
    Ok(())
}

/// Service rows from `compose ps --all --format json`.
///
/// # Errors
///
/// Returns an error if compose fails or prints unparseable output.
pub async fn status(runner: &impl CommandRunner, project: &ComposeProject) -> Result<StackStatus> {
    let out = compose(runner, project, &["ps", "--all", "--format", "json"]).await?;
    if !out.status.success() {
        return Err(DeployError::ComposeFailed {
            action: "ps".to_string(),
            stderr: stderr_of(&out),
        }
        .into());
    }
    let services: Vec<ServiceStatus> = parse_compose_ps(&String::from_utf8_lossy(&out.stdout))?;
    let healthy = !services.is_empty() && services.iter().all(ServiceStatus::is_up);
    Ok(StackStatus { services, healthy })
}

/// Options for [`logs`].
#[derive(Debug, Clone, Default)]
pub struct LogsOptions {
    pub tail: Option<u32>,
    pub follow: bool,
    pub service: Option<String>,
}

/// Stream `compose logs` to the terminal.
///
/// # Errors
///
/// Returns an error if compose cannot be spawned or exits non-zero.
pub async fn logs(
    runner: &impl CommandRunner,
    project: &ComposeProject,
    opts: &LogsOptions,
) -> Result<()> {
    let tail = opts.tail.map(|t| t.to_string());
    let mut sub: Vec<&str> = vec!["logs"];
    if let Some(tail) = tail.as_deref() {
        sub.extend(["--tail", tail]);
    }
    if opts.follow {
        sub.push("--follow");
    }
    if let Some(service) = opts.service.as_deref() {
        sub.push(service);
    }
    let args = project.args(&sub);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let status = runner.run_status(project.program(), &refs).await?;
    if !status.success() {
        anyhow::bail!("compose logs exited with {status}");
    }
    Ok(())
}
