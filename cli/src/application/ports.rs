//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared wire types;
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use n8n_deploy_common::{CredentialWebhookPayload, LoginRequest, SecretNoteRequest};

use crate::domain::DeployConfig;
use crate::domain::owner::{InsertPlan, OwnerProfile};
use crate::domain::session::LoginOutcome;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts the local filesystem for the deployment directory.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` and all missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Set unix permission bits. No-op on other platforms.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads and persists the deployment config file.
pub trait ConfigStore {
    /// Load the config, returning defaults when the file does not exist.
    fn load(&self) -> Result<DeployConfig>;
    fn save(&self, config: &DeployConfig) -> Result<()>;
    /// Location of the config file.
    fn path(&self) -> PathBuf;
}

// ── Readiness Port ────────────────────────────────────────────────────────────

/// A single readiness check, retried by the readiness service.
#[allow(async_fn_in_trait)]
pub trait ReadinessProbe {
    /// `true` when the target is ready. Transport failures are `false`.
    async fn is_ready(&self) -> bool;
}

// ── Owner Store Port ──────────────────────────────────────────────────────────

/// Direct access to the application's user table.
#[allow(async_fn_in_trait)]
pub trait OwnerStore {
    /// Whether the database accepts queries.
    async fn ping(&self) -> bool;
    /// Whether the application has created its `user` table.
    async fn schema_ready(&self) -> bool;
    /// Whether a user with `email` already exists.
    async fn owner_exists(&self, email: &str) -> Result<bool>;
    /// Column names of the `user` table.
    async fn user_columns(&self) -> Result<Vec<String>>;
    /// Whether the application has created its `role` table.
    async fn role_table_ready(&self) -> bool;
    /// Id of the global owner role, if the `role` table has one.
    async fn owner_role_id(&self) -> Result<Option<String>>;
    /// Execute `plan` with the given profile and password hash bound.
    async fn insert_owner(
        &self,
        plan: &InsertPlan,
        profile: &OwnerProfile,
        password_hash: &str,
    ) -> Result<()>;
}

// ── HTTP Ports ────────────────────────────────────────────────────────────────

/// Raw HTTP reply: status and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Outbound calls that deliver owner credentials.
#[allow(async_fn_in_trait)]
pub trait CredentialChannel {
    /// POST a secret note to the one-time note service.
    async fn create_secret_note(&self, url: &str, note: &SecretNoteRequest) -> Result<HttpReply>;
    /// POST the credential payload to the notification webhook.
    async fn post_webhook(
        &self,
        url: &str,
        access_key: &str,
        application: &str,
        payload: &CredentialWebhookPayload,
    ) -> Result<HttpReply>;
}

/// Logs into the application's REST API.
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    /// POST `{base_url}/rest/login`.
    async fn login(&self, base_url: &str, request: &LoginRequest) -> Result<LoginOutcome>;
}
