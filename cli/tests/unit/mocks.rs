//! Shared mock infrastructure for unit tests.
//!
//! Hand-written port implementations so each test file doesn't have to
//! re-define the same boilerplate.

#![allow(dead_code, clippy::expect_used)]

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use n8n_deploy_cli::application::ports::{
    CommandRunner, CredentialChannel, HttpReply, LocalFs, OwnerStore, ProgressReporter,
    ReadinessProbe, SessionClient,
};
use n8n_deploy_cli::domain::owner::{InsertPlan, OwnerProfile};
use n8n_deploy_cli::domain::session::LoginOutcome;
use n8n_deploy_cli::domain::{ComposeFlavor, ComposeProject, OwnerCredentials};
use n8n_deploy_common::{CredentialWebhookPayload, LoginRequest, SecretNoteRequest};

use crate::helpers::{exit_status, ok_output};

// ── Command runner ────────────────────────────────────────────────────────────

type Responder = Box<dyn Fn(&str, &[&str]) -> Result<Output> + Send + Sync>;

/// Records every invocation as `"program arg1 arg2 ..."` and answers through
/// a closure.
pub struct ScriptedRunner {
    respond: Responder,
    pub calls: Mutex<Vec<String>>,
    pub stdin: Mutex<Vec<String>>,
    pub timeouts: Mutex<Vec<Duration>>,
}

impl ScriptedRunner {
    pub fn new(respond: impl Fn(&str, &[&str]) -> Result<Output> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
            stdin: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
        }
    }

    /// Every command succeeds with empty output.
    pub fn all_ok() -> Self {
        Self::new(|_, _| Ok(ok_output(b"")))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Calls whose command line contains `needle`.
    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.contains(needle)).collect()
    }

    fn record(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("lock").push(line);
        (self.respond)(program, args)
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.record(program, args)
    }
    async fn run_with_timeout(&self, program: &str, args: &[&str], timeout: Duration) -> Result<Output> {
        self.timeouts.lock().expect("lock").push(timeout);
        self.record(program, args)
    }
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output> {
        self.stdin
            .lock()
            .expect("lock")
            .push(String::from_utf8_lossy(stdin).into_owned());
        self.record(program, args)
    }
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        self.record(program, args).map(|o| o.status)
    }
}

/// Responder for a host with docker, the compose plugin, and every compose
/// subcommand succeeding.
pub fn docker_host(program: &str, args: &[&str]) -> Result<Output> {
    match (program, args.first().copied()) {
        ("docker", Some("--version")) => Ok(ok_output(b"Docker version 27.3.1, build ce12230\n")),
        ("docker", Some("compose")) if args.get(1) == Some(&"version") => {
            Ok(ok_output(b"Docker Compose version v2.29.7\n"))
        }
        _ => Ok(ok_output(b"")),
    }
}

/// Responder for a host where no binary can be spawned.
pub fn empty_host(program: &str, _: &[&str]) -> Result<Output> {
    anyhow::bail!("failed to spawn {program}: No such file or directory")
}

pub fn plugin_project() -> ComposeProject {
    ComposeProject::new(
        ComposeFlavor::Plugin,
        Path::new("/srv/n8n/docker-compose.yml"),
        Path::new("/srv/n8n"),
    )
}

// ── Filesystem ────────────────────────────────────────────────────────────────

/// In-memory filesystem.
#[derive(Default)]
pub struct MemFs {
    pub files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    pub dirs: Mutex<Vec<PathBuf>>,
    pub modes: Mutex<HashMap<PathBuf, u32>>,
}

impl MemFs {
    pub fn with_files<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let fs = Self::default();
        for p in paths {
            fs.files.lock().expect("lock").insert(p.to_path_buf(), Vec::new());
        }
        fs
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .expect("lock")
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn mode(&self, path: &Path) -> Option<u32> {
        self.modes.lock().expect("lock").get(path).copied()
    }
}

impl LocalFs for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock").contains_key(path)
            || self.dirs.lock().expect("lock").iter().any(|d| d == path)
    }
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.contents(path)
            .ok_or_else(|| anyhow::anyhow!("{} not found", path.display()))
    }
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.modes.lock().expect("lock").insert(path.to_path_buf(), mode);
        Ok(())
    }
}

// ── Readiness probe ───────────────────────────────────────────────────────────

/// Becomes ready on attempt `ready_on` (never when `None`).
pub struct CountingProbe {
    ready_on: Option<u32>,
    pub attempts: Cell<u32>,
}

impl CountingProbe {
    pub fn ready_on(attempt: u32) -> Self {
        Self { ready_on: Some(attempt), attempts: Cell::new(0) }
    }
    pub fn never() -> Self {
        Self { ready_on: None, attempts: Cell::new(0) }
    }
}

impl ReadinessProbe for CountingProbe {
    async fn is_ready(&self) -> bool {
        let n = self.attempts.get() + 1;
        self.attempts.set(n);
        self.ready_on.is_some_and(|r| n >= r)
    }
}

// ── Progress reporter ─────────────────────────────────────────────────────────

/// Captures every reported message, prefixed with its kind.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }
    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| m.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().expect("lock").push(format!("warn: {message}"));
    }
}

// ── Owner store ───────────────────────────────────────────────────────────────

/// Fake `user` table.
pub struct FakeOwnerStore {
    pub db_ready_on: u32,
    pub schema_ready_on: u32,
    pub role_table_ready_on: u32,
    pub pings: Cell<u32>,
    pub schema_checks: Cell<u32>,
    pub role_table_checks: Cell<u32>,
    pub owner_role: Option<String>,
    pub existing: Vec<String>,
    pub columns: Vec<String>,
    pub inserted: Mutex<Option<(String, OwnerProfile, String)>>,
}

impl FakeOwnerStore {
    pub fn ready(columns: &[&str]) -> Self {
        Self {
            db_ready_on: 1,
            schema_ready_on: 1,
            role_table_ready_on: 1,
            pings: Cell::new(0),
            schema_checks: Cell::new(0),
            role_table_checks: Cell::new(0),
            owner_role: Some("1".to_string()),
            existing: Vec::new(),
            columns: columns.iter().map(ToString::to_string).collect(),
            inserted: Mutex::new(None),
        }
    }

    pub fn inserted(&self) -> Option<(String, OwnerProfile, String)> {
        self.inserted.lock().expect("lock").clone()
    }
}

impl OwnerStore for FakeOwnerStore {
    async fn ping(&self) -> bool {
        let n = self.pings.get() + 1;
        self.pings.set(n);
        n >= self.db_ready_on
    }
    async fn schema_ready(&self) -> bool {
        let n = self.schema_checks.get() + 1;
        self.schema_checks.set(n);
        n >= self.schema_ready_on
    }
    async fn owner_exists(&self, email: &str) -> Result<bool> {
        Ok(self.existing.iter().any(|e| e == email))
    }
    async fn user_columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }
    async fn role_table_ready(&self) -> bool {
        let n = self.role_table_checks.get() + 1;
        self.role_table_checks.set(n);
        n >= self.role_table_ready_on
    }
    async fn owner_role_id(&self) -> Result<Option<String>> {
        Ok(self.owner_role.clone())
    }
    async fn insert_owner(&self, plan: &InsertPlan, profile: &OwnerProfile, hash: &str) -> Result<()> {
        *self.inserted.lock().expect("lock") = Some((plan.to_sql(), profile.clone(), hash.to_string()));
        Ok(())
    }
}

// ── Credential channel ────────────────────────────────────────────────────────

/// Canned replies; `None` simulates a transport failure.
pub struct FakeChannel {
    pub note_reply: Option<HttpReply>,
    pub webhook_reply: Option<HttpReply>,
    pub note_urls: Mutex<Vec<String>>,
    pub notes: Mutex<Vec<SecretNoteRequest>>,
    pub webhooks: Mutex<Vec<(String, String, String, CredentialWebhookPayload)>>,
}

impl FakeChannel {
    pub fn new(note_reply: Option<HttpReply>, webhook_reply: Option<HttpReply>) -> Self {
        Self {
            note_reply,
            webhook_reply,
            note_urls: Mutex::new(Vec::new()),
            notes: Mutex::new(Vec::new()),
            webhooks: Mutex::new(Vec::new()),
        }
    }
}

pub fn reply(status: u16, body: &str) -> HttpReply {
    HttpReply { status, body: body.to_string() }
}

impl CredentialChannel for FakeChannel {
    async fn create_secret_note(&self, url: &str, note: &SecretNoteRequest) -> Result<HttpReply> {
        self.note_urls.lock().expect("lock").push(url.to_string());
        self.notes.lock().expect("lock").push(note.clone());
        self.note_reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }
    async fn post_webhook(
        &self,
        url: &str,
        access_key: &str,
        application: &str,
        payload: &CredentialWebhookPayload,
    ) -> Result<HttpReply> {
        self.webhooks.lock().expect("lock").push((
            url.to_string(),
            access_key.to_string(),
            application.to_string(),
            payload.clone(),
        ));
        self.webhook_reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }
}

// ── Session client ────────────────────────────────────────────────────────────

pub struct FakeSessionClient {
    pub outcome: LoginOutcome,
    pub requests: Mutex<Vec<(String, LoginRequest)>>,
}

impl FakeSessionClient {
    pub fn new(outcome: LoginOutcome) -> Self {
        Self { outcome, requests: Mutex::new(Vec::new()) }
    }
}

impl SessionClient for FakeSessionClient {
    async fn login(&self, base_url: &str, request: &LoginRequest) -> Result<LoginOutcome> {
        self.requests
            .lock()
            .expect("lock")
            .push((base_url.to_string(), request.clone()));
        Ok(self.outcome.clone())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn owner(password: &str) -> OwnerCredentials {
    let profile = OwnerProfile::new("ada@example.com", "Ada", "Lovelace").expect("profile");
    OwnerCredentials::with_fallback(profile, Some(password.to_string()))
}

pub fn failed_status() -> ExitStatus {
    exit_status(1)
}
