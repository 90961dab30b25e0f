//! `n8n-deploy proxy`: run the auto-login reverse proxy.

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use n8n_deploy_common::LoginRequest;

use crate::commands::OwnerArgs;
use crate::domain::OwnerCredentials;

/// Arguments for the proxy command.
#[derive(Args)]
pub struct ProxyArgs {
    /// Address to listen on
    #[arg(long, env = "PROXY_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// n8n base URL
    #[arg(long, env = "N8N_UPSTREAM", default_value = "http://n8n:5678")]
    pub upstream: String,

    #[command(flatten)]
    pub owner: OwnerArgs,
}

/// Run the proxy until interrupted.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound.
pub async fn run(args: ProxyArgs) -> Result<ExitCode> {
    let creds = OwnerCredentials::with_fallback(args.owner.profile()?, args.owner.password.clone());
    tracing::info!(upstream = %args.upstream, email = %creds.profile.email, "starting auto-login proxy");
    let login = LoginRequest {
        email: creds.profile.email,
        password: creds.password,
    };
    crate::proxy::run(args.listen, &args.upstream, login).await?;
    Ok(ExitCode::SUCCESS)
}
