//! Application service: prerequisite checks.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, LocalFs};
use crate::domain::preflight::{FileCheck, ToolCheck, parse_tool_version};
use crate::domain::{ComposeFlavor, ComposeProject, DeployConfig, DeployError, PrerequisiteReport};

/// Run `program args` and report whether it exited successfully.
async fn probe_tool(runner: &impl CommandRunner, name: &str, program: &str, args: &[&str]) -> ToolCheck {
    match runner.run(program, args).await {
        Ok(out) if out.status.success() => ToolCheck {
            name: name.to_string(),
            found: true,
            version: parse_tool_version(&String::from_utf8_lossy(&out.stdout)),
        },
        Ok(out) => {
            tracing::debug!(program, status = ?out.status, "tool probe exited non-zero");
            ToolCheck { name: name.to_string(), found: false, version: None }
        }
        Err(e) => {
            tracing::debug!(program, error = %e, "tool probe failed to spawn");
            ToolCheck { name: name.to_string(), found: false, version: None }
        }
    }
}

/// Probe `docker`.
pub async fn probe_docker(runner: &impl CommandRunner) -> ToolCheck {
    probe_tool(runner, "docker", "docker", &["--version"]).await
}

/// Probe the compose front-end: the plugin first, then the standalone binary.
pub async fn probe_compose(runner: &impl CommandRunner) -> (ToolCheck, Option<ComposeFlavor>) {
    let plugin = probe_tool(runner, "docker compose", "docker", &["compose", "version"]).await;
    if plugin.found {
        return (plugin, Some(ComposeFlavor::Plugin));
    }
    let standalone = probe_tool(runner, "docker-compose", "docker-compose", &["--version"]).await;
    if standalone.found {
        return (standalone, Some(ComposeFlavor::Standalone));
    }
    (
        ToolCheck { name: "docker compose".to_string(), found: false, version: None },
        None,
    )
}

fn check_files(fs: &impl LocalFs, config: &DeployConfig, dir: &Path) -> Vec<FileCheck> {
    config
        .required_files(dir)
        .into_iter()
        .map(|(label, path)| FileCheck {
            label: label.to_string(),
            present: fs.exists(&path),
            path,
        })
        .collect()
}

async fn ensure_tools(runner: &impl CommandRunner) -> Result<ComposeFlavor> {
    let docker = probe_docker(runner).await;
    if !docker.found {
        return Err(DeployError::MissingTool { tool: "docker".to_string() }.into());
    }
    let (_, flavor) = probe_compose(runner).await;
    flavor.ok_or_else(|| DeployError::MissingTool { tool: "docker compose".to_string() }.into())
}

fn ensure_file(fs: &impl LocalFs, path: &Path) -> Result<()> {
    if fs.exists(path) {
        Ok(())
    } else {
        Err(DeployError::MissingFile { path: path.display().to_string() }.into())
    }
}

/// Check docker, compose and the three config files in that order, stopping
/// at the first one that is missing.
///
/// Returns the compose project to drive on success. No compose subcommand is
/// run before every check has passed.
///
/// # Errors
///
/// Returns [`DeployError::MissingTool`] or [`DeployError::MissingFile`] for
/// the first missing prerequisite.
pub async fn ensure_prerequisites(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    config: &DeployConfig,
    dir: &Path,
) -> Result<ComposeProject> {
    let flavor = ensure_tools(runner).await?;
    for (_, path) in config.required_files(dir) {
        ensure_file(fs, &path)?;
    }

    let compose_file = DeployConfig::resolve(dir, &config.files.compose);
    Ok(ComposeProject::new(flavor, &compose_file, dir))
}

/// Check docker, compose and the compose file only.
///
/// Commands that drive an already-deployed stack (`down`, `status`, `logs`,
/// `provision`) need nothing from `nginx/`.
///
/// # Errors
///
/// Returns [`DeployError::MissingTool`] or [`DeployError::MissingFile`] for
/// the first missing prerequisite.
pub async fn ensure_compose(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    config: &DeployConfig,
    dir: &Path,
) -> Result<ComposeProject> {
    let flavor = ensure_tools(runner).await?;
    let compose_file = DeployConfig::resolve(dir, &config.files.compose);
    ensure_file(fs, &compose_file)?;
    Ok(ComposeProject::new(flavor, &compose_file, dir))
}

/// Probe every prerequisite without stopping; used by `doctor`.
pub async fn probe_prerequisites(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    config: &DeployConfig,
    dir: &Path,
) -> PrerequisiteReport {
    let docker = probe_docker(runner).await;
    let (compose, compose_flavor) = probe_compose(runner).await;
    PrerequisiteReport {
        docker,
        compose,
        compose_flavor,
        files: check_files(fs, config, dir),
    }
}
