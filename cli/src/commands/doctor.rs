//! `n8n-deploy doctor`: deployment diagnostics.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::doctor::run_doctor;
use crate::domain::{DoctorReport, collect_issues};
use crate::infra::http::HttpHealthProbe;
use crate::output::json;

#[derive(Serialize)]
struct DoctorJson<'a> {
    status: &'static str,
    #[serde(flatten)]
    report: &'a DoctorReport,
    issues: &'a [String],
}

/// Run the doctor command. Exits 1 when any issue is found.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config()?;
    let probe = HttpHealthProbe::new(&config.health.url)?;
    let report = run_doctor(
        &app.runner,
        &app.fs,
        &probe,
        &config,
        &app.dir,
        &app.reporter(),
    )
    .await;
    let issues = collect_issues(&report);

    if app.is_json() {
        json::print(&DoctorJson {
            status: if issues.is_empty() { "healthy" } else { "unhealthy" },
            report: &report,
            issues: &issues,
        })?;
    } else {
        println!();
        app.renderer().render_doctor(&report, &issues);
    }

    Ok(if issues.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
