//! Compose invocation building and `compose ps` parsing.
//!
//! Pure functions only: the argument vectors built here are executed by the
//! infrastructure `CommandRunner`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use n8n_deploy_common::ServiceStatus;

/// Which compose front-end is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeFlavor {
    /// `docker compose` (CLI plugin, compose v2).
    Plugin,
    /// Standalone `docker-compose` binary.
    Standalone,
}

impl ComposeFlavor {
    /// Human-readable command name.
    #[must_use]
    pub fn display(self) -> &'static str {
        match self {
            Self::Plugin => "docker compose",
            Self::Standalone => "docker-compose",
        }
    }
}

/// A compose project rooted at a deployment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeProject {
    pub flavor: ComposeFlavor,
    pub file: PathBuf,
    pub project_dir: PathBuf,
}

impl ComposeProject {
    #[must_use]
    pub fn new(flavor: ComposeFlavor, file: &Path, project_dir: &Path) -> Self {
        Self {
            flavor,
            file: file.to_path_buf(),
            project_dir: project_dir.to_path_buf(),
        }
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &'static str {
        match self.flavor {
            ComposeFlavor::Plugin => "docker",
            ComposeFlavor::Standalone => "docker-compose",
        }
    }

    /// Full argument vector for a compose subcommand.
    #[must_use]
    pub fn args(&self, subcommand: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(subcommand.len() + 5);
        if self.flavor == ComposeFlavor::Plugin {
            args.push("compose".to_string());
        }
        args.push("-f".to_string());
        args.push(self.file.to_string_lossy().into_owned());
        args.push("--project-directory".to_string());
        args.push(self.project_dir.to_string_lossy().into_owned());
        args.extend(subcommand.iter().map(|s| (*s).to_string()));
        args
    }
}

/// Parse `compose ps --format json`.
///
/// Compose ≥ 2.21 prints one JSON object per line; older releases print a
/// single JSON array. Both are accepted. Blank output means no services.
///
/// # Errors
///
/// Returns an error if a non-blank line is not valid JSON.
pub fn parse_compose_ps(stdout: &str) -> Result<Vec<ServiceStatus>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("parsing compose ps output");
    }
    trimmed
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).context("parsing compose ps output"))
        .collect()
}
