//! `n8n-deploy login`: log in as the owner and optionally keep the session.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::login::login;
use crate::commands::OwnerArgs;
use crate::domain::{DeployConfig, OwnerCredentials};
use crate::infra::http::HttpSessionClient;
use crate::output::json;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    #[command(flatten)]
    pub owner: OwnerArgs,

    /// n8n base URL (defaults to the health URL's origin)
    #[arg(long)]
    pub url: Option<String>,

    /// Write session cookies to this file (mode 0600)
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,
}

/// Log in with `creds` and report the result. Shared with `provision --login`.
///
/// # Errors
///
/// Returns an error if the request fails or the credentials are rejected.
pub async fn login_with(
    app: &AppContext,
    config: &DeployConfig,
    creds: &OwnerCredentials,
    url: Option<&str>,
    cookie_file: Option<PathBuf>,
) -> Result<usize> {
    let base_url = url.map_or_else(|| config.app_base_url(), str::to_string);
    let cookie_file = cookie_file
        .or_else(|| config.session_cookie_file.clone())
        .map(|p| DeployConfig::resolve(&app.dir, &p));
    let client = HttpSessionClient::new()?;
    let cookies = login(
        &client,
        &app.fs,
        &base_url,
        creds,
        cookie_file.as_deref(),
        &app.reporter(),
    )
    .await?;
    Ok(cookies.len())
}

/// Run the login command.
///
/// # Errors
///
/// Returns an error if the request fails or the credentials are rejected.
pub async fn run(app: &AppContext, args: LoginArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let creds = OwnerCredentials::with_fallback(args.owner.profile()?, args.owner.password.clone());
    let count = login_with(app, &config, &creds, args.url.as_deref(), args.cookie_file).await?;
    if app.is_json() {
        json::print(&serde_json::json!({
            "email": creds.profile.email,
            "authenticated": count > 0,
            "cookies": count,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}
