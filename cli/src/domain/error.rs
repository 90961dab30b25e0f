//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors raised while checking prerequisites and driving the stack.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeployError {
    #[error("{tool} is not installed or not on PATH. Install it and retry.")]
    MissingTool { tool: String },

    #[error("Required file not found: {path}\n\nRun 'n8n-deploy init' to write the default bundle.")]
    MissingFile { path: String },

    #[error("{target} did not become ready after {attempts} attempts.\n\nView logs: n8n-deploy logs")]
    NotReady { target: String, attempts: u32 },

    #[error("docker compose {action} failed.\n{stderr}")]
    ComposeFailed { action: String, stderr: String },
}

impl DeployError {
    /// Machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTool { .. } => "missing_tool",
            Self::MissingFile { .. } => "missing_file",
            Self::NotReady { .. } => "not_ready",
            Self::ComposeFailed { .. } => "compose_failed",
        }
    }
}

// ── Owner errors ──────────────────────────────────────────────────────────────

/// Errors related to owner account provisioning.
#[derive(Debug, Error)]
pub enum OwnerError {
    #[error("Invalid owner email '{0}'")]
    InvalidEmail(String),

    #[error("Owner {0} must not be empty")]
    EmptyField(&'static str),

    #[error("The user table has no '{0}' column; cannot create the owner account.")]
    MissingColumn(&'static str),

    #[error("Database rejected the owner account:\n{0}")]
    InsertFailed(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
