//! `n8n-deploy up`: (re)start the stack.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack::{self, UpOptions};
use crate::commands::full_project;
use crate::output::json;

/// Run the up command.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or `compose up` fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let project = full_project(app, &config).await?;
    let opts = UpOptions {
        settle: Duration::from_secs(config.timing.settle_secs),
        log_tail: config.timing.log_tail,
    };
    let report = stack::up(&app.runner, &project, opts, &app.reporter()).await?;

    if app.is_json() {
        json::print(&serde_json::json!({
            "started": true,
            "torn_down": report.torn_down,
            "ps": report.ps,
            "logs": report.logs,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(ps) = &report.ps {
        println!();
        app.output.header("Containers:");
        app.output.block(ps);
    }
    if let Some(logs) = &report.logs {
        println!();
        app.output.header(&format!("Recent logs (last {} lines):", opts.log_tail));
        app.output.block(logs);
    }
    println!();
    app.output.success("Stack is up. Next: n8n-deploy provision");
    Ok(ExitCode::SUCCESS)
}
