//! Domain types and validators for the deployment configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::readiness::PollPolicy;

// ── Constants ────────────────────────────────────────────────────────────────

/// File name of the per-deployment config, relative to the deployment dir.
pub const CONFIG_FILE_NAME: &str = "n8n-deploy.yaml";

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "health.url",
    "health.attempts",
    "health.interval_secs",
    "timing.settle_secs",
    "timing.init_delay_secs",
    "timing.log_tail",
    "services.app",
    "services.database",
    "services.proxy",
    "database.name",
    "database.user",
    "instance_url",
];

static SERVICE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // compile-time constant pattern
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,62}$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `<deploy dir>/n8n-deploy.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Files that must exist before the stack is started.
    pub files: FilesConfig,
    /// Compose service names.
    pub services: ServicesConfig,
    /// Application health endpoint and polling policy.
    pub health: HealthConfig,
    /// Fixed waits and output sizes.
    pub timing: TimingConfig,
    /// Database coordinates used by `provision --method database`.
    pub database: DatabaseConfig,
    /// Public URL of the instance, reported to the credential webhook.
    pub instance_url: String,
    /// Where `login` stores session cookies. Not written when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Container orchestration declaration.
    pub compose: PathBuf,
    /// Reverse proxy top-level configuration.
    pub proxy: PathBuf,
    /// Site-specific reverse proxy configuration.
    pub site: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            compose: PathBuf::from("docker-compose.yml"),
            proxy: PathBuf::from("nginx/nginx.conf"),
            site: PathBuf::from("nginx/conf.d/n8n.conf"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub app: String,
    pub database: String,
    pub proxy: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            app: "n8n".to_string(),
            database: "postgres".to_string(),
            proxy: "nginx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub url: String,
    pub attempts: u32,
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5678/healthz".to_string(),
            attempts: PollPolicy::APP_HEALTH.attempts(),
            interval_secs: PollPolicy::APP_HEALTH.interval().as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after `up -d` before inspecting status.
    pub settle_secs: u64,
    /// Wait after the health check passes, before creating the owner.
    pub init_delay_secs: u64,
    /// Number of log lines shown after startup.
    pub log_tail: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_secs: 10,
            init_delay_secs: 10,
            log_tail: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "n8n".to_string(),
            user: "n8n".to_string(),
        }
    }
}

impl DeployConfig {
    /// Polling policy for the application health endpoint.
    #[must_use]
    pub fn health_policy(&self) -> PollPolicy {
        PollPolicy::new(self.health.attempts, Duration::from_secs(self.health.interval_secs))
    }

    /// Resolve a configured path against the deployment directory.
    #[must_use]
    pub fn resolve(dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        }
    }

    /// The three required files in check order, with a label for each.
    #[must_use]
    pub fn required_files(&self, dir: &Path) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("compose file", Self::resolve(dir, &self.files.compose)),
            ("proxy config", Self::resolve(dir, &self.files.proxy)),
            ("site config", Self::resolve(dir, &self.files.site)),
        ]
    }

    /// Base URL of the application, derived from the health URL.
    #[must_use]
    pub fn app_base_url(&self) -> String {
        base_url_of(&self.health.url)
    }

    /// Set a whitelisted key. The value must already be validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "health.url" => self.health.url = value.to_string(),
            "health.attempts" => self.health.attempts = value.parse()?,
            "health.interval_secs" => self.health.interval_secs = value.parse()?,
            "timing.settle_secs" => self.timing.settle_secs = value.parse()?,
            "timing.init_delay_secs" => self.timing.init_delay_secs = value.parse()?,
            "timing.log_tail" => self.timing.log_tail = value.parse()?,
            "services.app" => self.services.app = value.to_string(),
            "services.database" => self.services.database = value.to_string(),
            "services.proxy" => self.services.proxy = value.to_string(),
            "database.name" => self.database.name = value.to_string(),
            "database.user" => self.database.user = value.to_string(),
            "instance_url" => self.instance_url = value.to_string(),
            _ => anyhow::bail!("unhandled config key: {key}"),
        }
        Ok(())
    }
}

/// Strip the path, query and fragment from an HTTP URL.
///
/// `http://localhost:5678/healthz` → `http://localhost:5678`.
#[must_use]
pub fn base_url_of(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("http", url));
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    format!("{scheme}://{authority}")
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.to_string(),
        }
        .into()
    };

    match key {
        "health.url" | "instance_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("an http:// or https:// URL"));
            }
        }
        "health.attempts" | "timing.log_tail" => {
            if !value.parse::<u32>().is_ok_and(|n| n >= 1) {
                return Err(invalid("a whole number >= 1"));
            }
        }
        "health.interval_secs" | "timing.settle_secs" | "timing.init_delay_secs" => {
            if value.parse::<u64>().is_err() {
                return Err(invalid("a whole number of seconds"));
            }
        }
        "services.app" | "services.database" | "services.proxy" | "database.name"
        | "database.user" => {
            if !SERVICE_NAME_RE.is_match(value) {
                return Err(invalid("letters, digits, '_', '.' or '-'"));
            }
        }
        _ => {}
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
