//! `n8n-deploy init`: write the deployment bundle.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::LocalFs as _;
use crate::application::services::bundle::write_bundle;
use crate::infra::assets::bundle_files;
use crate::output::json;

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite files that already exist
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn run(app: &AppContext, args: &InitArgs) -> Result<ExitCode> {
    let files = bundle_files();
    let mut force = args.force;
    if force
        && files.iter().any(|(rel, _)| app.fs.exists(&app.dir.join(rel)))
        && !app.confirm("Overwrite existing deployment files?", true)?
    {
        force = false;
    }

    app.fs.create_dir_all(&app.dir)?;
    let report = write_bundle(&app.fs, &app.dir, files, force, &app.reporter())?;

    if app.is_json() {
        json::print(&report)?;
    } else if !report.written.is_empty() {
        println!();
        app.output.info("Next: n8n-deploy doctor && n8n-deploy up");
    }
    Ok(ExitCode::SUCCESS)
}
