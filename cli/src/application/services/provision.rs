//! Application service: owner account creation through the n8n CLI.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProgressReporter, ReadinessProbe};
use crate::application::services::readiness::wait_until_ready;
use crate::domain::owner::classify_exit;
use crate::domain::{ComposeProject, CreateOutcome, OwnerCredentials, PollPolicy};

/// Timeout for the in-container `user:create` command.
pub const CREATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for [`provision_via_cli`].
#[derive(Debug, Clone)]
pub struct CliProvisionOptions {
    /// Compose service running the application.
    pub app_service: String,
    /// Health polling policy.
    pub health: PollPolicy,
    /// Extra wait after the health check passes.
    pub init_delay: Duration,
}

/// Build the `compose exec` arguments for `n8n user:create`.
#[must_use]
pub fn user_create_args(
    project: &ComposeProject,
    app_service: &str,
    creds: &OwnerCredentials,
) -> Vec<String> {
    project.args(&[
        "exec",
        "-T",
        app_service,
        "n8n",
        "user:create",
        "--email",
        &creds.profile.email,
        "--password",
        &creds.password,
        "--firstName",
        &creds.profile.first_name,
        "--lastName",
        &creds.profile.last_name,
    ])
}

/// Wait for the application, then create the owner with its own CLI.
///
/// Every exit code of the creation command is an overall success; the
/// returned outcome tells which case applied.
///
/// # Errors
///
/// Returns [`crate::domain::DeployError::NotReady`] if the health endpoint
/// never answers, or an error if the creation command cannot be spawned.
pub async fn provision_via_cli(
    runner: &impl CommandRunner,
    probe: &impl ReadinessProbe,
    project: &ComposeProject,
    creds: &OwnerCredentials,
    opts: &CliProvisionOptions,
    reporter: &impl ProgressReporter,
) -> Result<CreateOutcome> {
    wait_until_ready(probe, opts.health, "n8n", reporter).await?;

    if !opts.init_delay.is_zero() {
        reporter.step(&format!(
            "waiting {}s for database initialisation...",
            opts.init_delay.as_secs()
        ));
        tokio::time::sleep(opts.init_delay).await;
    }

    reporter.step(&format!("creating owner account {}...", creds.profile.email));
    let args = user_create_args(project, &opts.app_service, creds);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = runner
        .run_with_timeout(project.program(), &refs, CREATE_TIMEOUT)
        .await?;

    let outcome = classify_exit(out.status.code(), &String::from_utf8_lossy(&out.stderr));
    tracing::info!(email = %creds.profile.email, ?outcome, "owner creation finished");
    Ok(outcome)
}
