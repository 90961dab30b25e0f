//! `n8n-deploy down`: stop the stack.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack;
use crate::commands::compose_project;

/// Run the down command.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or `compose down` fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let project = compose_project(app, &config).await?;
    stack::down(&app.runner, &project, &app.reporter()).await?;
    if app.is_json() {
        println!(r#"{{"stopped":true}}"#);
    }
    Ok(ExitCode::SUCCESS)
}
