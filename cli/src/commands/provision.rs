//! `n8n-deploy provision`: create the n8n owner account.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::notify::{NotifyReport, NotifySettings, notify_credentials};
use crate::application::services::provision::{CliProvisionOptions, provision_via_cli};
use crate::application::services::provision_db::{DbProvisionOptions, provision_via_database};
use crate::commands::login::login_with;
use crate::commands::{OwnerArgs, compose_project};
use crate::domain::{CreateOutcome, OwnerCredentials, PasswordSource};
use crate::infra::http::{HttpCredentialChannel, HttpHealthProbe};
use crate::infra::psql::PsqlOwnerStore;
use crate::output::json;

/// How the owner account is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ProvisionMethod {
    /// `n8n user:create` inside the n8n container
    #[default]
    Cli,
    /// Insert straight into the PostgreSQL `user` table
    Database,
}

/// Credential delivery endpoints.
#[derive(Args, Clone, Debug, Default)]
pub struct NotifyArgs {
    /// One-time secret note service endpoint
    #[arg(long, env = "OTN_URL")]
    pub otn_url: Option<String>,

    /// Webhook receiving the credential link
    #[arg(long, env = "AGENTIC_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Access key sent as X-Access-Key
    #[arg(long, env = "AGENTIC_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Application name sent as X-Application
    #[arg(long, env = "AGENTIC_APPLICATION")]
    pub application: Option<String>,
}

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Creation method
    #[arg(long, value_enum, default_value_t = ProvisionMethod::Cli)]
    pub method: ProvisionMethod,

    #[command(flatten)]
    pub owner: OwnerArgs,

    #[command(flatten)]
    pub notify: NotifyArgs,

    /// Log in afterwards and store the session
    #[arg(long)]
    pub login: bool,
}

#[derive(Serialize)]
struct ProvisionJson<'a> {
    email: &'a str,
    #[serde(flatten)]
    outcome: &'a CreateOutcome,
    password_source: PasswordSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_password: Option<&'a str>,
    notification: &'a NotifyReport,
}

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing, a readiness wait is
/// exhausted, or the database rejects the account.
pub async fn run(app: &AppContext, args: ProvisionArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let profile = args.owner.profile()?;
    let project = compose_project(app, &config).await?;
    let reporter = app.reporter();

    let (creds, outcome) = match args.method {
        ProvisionMethod::Cli => {
            let creds = OwnerCredentials::with_fallback(profile, args.owner.password.clone());
            let probe = HttpHealthProbe::new(&config.health.url)?;
            let opts = CliProvisionOptions {
                app_service: config.services.app.clone(),
                health: config.health_policy(),
                init_delay: Duration::from_secs(config.timing.init_delay_secs),
            };
            let outcome =
                provision_via_cli(&app.runner, &probe, &project, &creds, &opts, &reporter).await?;
            (creds, outcome)
        }
        ProvisionMethod::Database => {
            let creds = OwnerCredentials::with_generated(
                profile,
                args.owner.password.clone(),
                &mut rand::rng(),
            );
            let store = PsqlOwnerStore::new(
                &app.runner,
                &project,
                &config.services.database,
                &config.database.name,
                &config.database.user,
            );
            let outcome =
                provision_via_database(&store, &creds, DbProvisionOptions::default(), &reporter)
                    .await?;
            (creds, outcome)
        }
    };

    let mut notification = NotifyReport::default();
    let settings = NotifySettings {
        note_url: args.notify.otn_url,
        webhook_url: args.notify.webhook_url,
        access_key: args.notify.access_key,
        application: args.notify.application,
        instance_url: config.instance_url.clone(),
    };
    if outcome == CreateOutcome::Created && settings.is_configured() {
        let channel = HttpCredentialChannel::new()?;
        notification = notify_credentials(&channel, &settings, &creds, &reporter).await;
    }

    if app.is_json() {
        json::print(&ProvisionJson {
            email: &creds.profile.email,
            outcome: &outcome,
            password_source: creds.source,
            generated_password: (creds.source == PasswordSource::Generated
                && outcome == CreateOutcome::Created)
                .then_some(creds.password.as_str()),
            notification: &notification,
        })?;
    } else {
        app.renderer().render_outcome(&outcome, &creds);
        if let Some(link) = &notification.credential_link {
            app.output.kv("Credential link:", link);
        }
    }

    if args.login {
        login_with(app, &config, &creds, None, None).await?;
    }
    Ok(ExitCode::SUCCESS)
}
