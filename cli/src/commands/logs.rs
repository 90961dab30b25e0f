//! `n8n-deploy logs`: show container logs.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::stack::{self, LogsOptions};
use crate::commands::compose_project;

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Number of lines to show per service
    #[arg(short = 'n', long)]
    pub tail: Option<u32>,

    /// Follow log output
    #[arg(short, long)]
    pub follow: bool,

    /// Only show this service
    pub service: Option<String>,
}

/// Run the logs command.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or compose fails.
pub async fn run(app: &AppContext, args: LogsArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let project = compose_project(app, &config).await?;
    let opts = LogsOptions {
        tail: args.tail,
        follow: args.follow,
        service: args.service,
    };
    stack::logs(&app.runner, &project, &opts).await?;
    Ok(ExitCode::SUCCESS)
}
