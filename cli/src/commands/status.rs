//! `n8n-deploy status`: container state.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::stack;
use crate::commands::compose_project;
use crate::output::{json, progress};

/// Run the status command.
///
/// # Errors
///
/// Returns an error if a prerequisite is missing or `compose ps` fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let project = compose_project(app, &config).await?;
    let status = progress::with_spinner(
        app.output.show_progress(),
        "reading container status...",
        "container status read",
        stack::status(&app.runner, &project),
    )
    .await?;
    if app.is_json() {
        json::print(&status)?;
    } else {
        app.renderer().render_status(&status);
    }
    Ok(ExitCode::SUCCESS)
}
