//! Application service: deployment doctor use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;
use std::time::Duration;

use crate::application::ports::{CommandRunner, LocalFs, ProgressReporter, ReadinessProbe};
use crate::application::services::preflight::probe_prerequisites;
use crate::domain::{ComposeProject, DeployConfig, DoctorReport};

/// Timeout for the one-off proxy container running `nginx -t`.
pub const PROXY_CHECK_TIMEOUT: Duration = Duration::from_secs(120);

/// Run every diagnostic and return the aggregated report.
///
/// The service never touches `OutputContext` or any presentation type;
/// rendering is the caller's responsibility.
pub async fn run_doctor(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    health: &impl ReadinessProbe,
    config: &DeployConfig,
    dir: &Path,
    reporter: &impl ProgressReporter,
) -> DoctorReport {
    reporter.step("checking prerequisites...");
    let prerequisites = probe_prerequisites(runner, fs, config, dir).await;

    let tools_ready = prerequisites.docker.found && prerequisites.files.iter().all(|f| f.present);
    let (proxy_config_valid, proxy_config_error) = match prerequisites.compose_flavor {
        Some(flavor) if tools_ready => {
            reporter.step("validating reverse proxy configuration...");
            let compose_file = DeployConfig::resolve(dir, &config.files.compose);
            let project = ComposeProject::new(flavor, &compose_file, dir);
            check_proxy_config(runner, &project, &config.services.proxy).await
        }
        _ => (None, None),
    };

    reporter.step("checking n8n health endpoint...");
    let app_healthy = health.is_ready().await;

    reporter.success("diagnostics complete");
    DoctorReport {
        prerequisites,
        proxy_config_valid,
        proxy_config_error,
        app_healthy,
    }
}

/// Run `nginx -t` in a throwaway proxy container.
async fn check_proxy_config(
    runner: &impl CommandRunner,
    project: &ComposeProject,
    proxy_service: &str,
) -> (Option<bool>, Option<String>) {
    let args = project.args(&["run", "--rm", "--no-deps", proxy_service, "nginx", "-t"]);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    match runner
        .run_with_timeout(project.program(), &refs, PROXY_CHECK_TIMEOUT)
        .await
    {
        Ok(out) if out.status.success() => (Some(true), None),
        Ok(out) => (
            Some(false),
            Some(String::from_utf8_lossy(&out.stderr).trim().to_string()),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "proxy config check could not run");
            (None, None)
        }
    }
}
