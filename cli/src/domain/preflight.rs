//! Prerequisite and doctor report types, plus pure diagnostic functions.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::stack::ComposeFlavor;

/// Oldest compose release with `--format json` on `ps` and `--project-directory`.
pub const MIN_COMPOSE_VERSION: semver::Version = semver::Version::new(1, 28, 0);

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // compile-time constant pattern
    Regex::new(r"v?(\d+\.\d+\.\d+)").expect("valid regex")
});

// ── Types ─────────────────────────────────────────────────────────────────────

/// Result of probing one external executable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolCheck {
    /// Command name as shown to the user.
    pub name: String,
    /// Whether the tool ran and exited successfully.
    pub found: bool,
    /// Version parsed from the tool's `--version` output.
    pub version: Option<String>,
}

/// Result of checking one required file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileCheck {
    pub label: String,
    pub path: PathBuf,
    pub present: bool,
}

/// Every prerequisite, probed without stopping at the first failure.
#[derive(Debug, Clone, Serialize)]
pub struct PrerequisiteReport {
    pub docker: ToolCheck,
    pub compose: ToolCheck,
    /// Detected compose front-end, if any.
    pub compose_flavor: Option<ComposeFlavor>,
    pub files: Vec<FileCheck>,
}

/// All checks performed by `doctor`.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub prerequisites: PrerequisiteReport,
    /// `None` when the proxy config could not be validated (tools missing).
    pub proxy_config_valid: Option<bool>,
    /// Output of `nginx -t` when validation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_config_error: Option<String>,
    /// Whether the application health endpoint answered.
    pub app_healthy: bool,
}

// ── Pure functions ────────────────────────────────────────────────────────────

/// Extract the first `x.y.z` version from a tool's version banner.
///
/// `Docker Compose version v2.24.5` → `2.24.5`.
#[must_use]
pub fn parse_tool_version(output: &str) -> Option<String> {
    VERSION_RE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a compose version string meets [`MIN_COMPOSE_VERSION`].
///
/// Unparseable versions are given the benefit of the doubt.
#[must_use]
pub fn compose_version_ok(version: Option<&str>) -> bool {
    version
        .and_then(|v| semver::Version::parse(v).ok())
        .is_none_or(|v| v >= MIN_COMPOSE_VERSION)
}

/// Collect actionable issues from a doctor report.
///
/// An unhealthy application is an issue only when the stack could have been
/// started at all (tools and files present); otherwise the root cause is
/// already listed.
#[must_use]
pub fn collect_issues(report: &DoctorReport) -> Vec<String> {
    let mut issues = Vec::new();
    let pre = &report.prerequisites;
    if !pre.docker.found {
        issues.push("docker is not installed".to_string());
    }
    if !pre.compose.found {
        issues.push("docker compose is not installed".to_string());
    } else if !compose_version_ok(pre.compose.version.as_deref()) {
        let ver = pre.compose.version.as_deref().unwrap_or("unknown");
        issues.push(format!(
            "docker compose {ver} is too old (need ≥ {MIN_COMPOSE_VERSION})"
        ));
    }
    for file in pre.files.iter().filter(|f| !f.present) {
        issues.push(format!("{} missing: {}", file.label, file.path.display()));
    }
    if report.proxy_config_valid == Some(false) {
        issues.push("reverse proxy configuration is invalid".to_string());
    }
    let startable = pre.docker.found && pre.compose.found && pre.files.iter().all(|f| f.present);
    if startable && !report.app_healthy {
        issues.push("n8n health endpoint is not responding".to_string());
    }
    issues
}

// ── Unit tests ────────────────────────────────────────────────────────────────
