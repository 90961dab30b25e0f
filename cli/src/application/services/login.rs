//! Application service: log into the n8n REST API and keep the session.

use std::path::Path;

use anyhow::{Context, Result, bail};
use n8n_deploy_common::LoginRequest;

use crate::application::ports::{LocalFs, ProgressReporter, SessionClient};
use crate::domain::OwnerCredentials;
use crate::domain::session::{LoginOutcome, SessionCookie, render_cookie_file};

/// Permission bits of the cookie file.
pub const COOKIE_FILE_MODE: u32 = 0o600;

/// Log in as the owner. On success the session cookies are returned and,
/// when `cookie_file` is set, written there one `name=value` per line.
///
/// An unexpected status is reported and yields no cookies.
///
/// # Errors
///
/// Returns an error if the request fails, the credentials are rejected, or
/// the cookie file cannot be written.
pub async fn login(
    client: &impl SessionClient,
    fs: &impl LocalFs,
    base_url: &str,
    creds: &OwnerCredentials,
    cookie_file: Option<&Path>,
    reporter: &impl ProgressReporter,
) -> Result<Vec<SessionCookie>> {
    reporter.step(&format!("logging in as {}...", creds.profile.email));
    let request = LoginRequest {
        email: creds.profile.email.clone(),
        password: creds.password.clone(),
    };
    match client.login(base_url, &request).await? {
        LoginOutcome::Authenticated { cookies } => {
            reporter.success(&format!("logged in ({} session cookies)", cookies.len()));
            if let Some(path) = cookie_file {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs.create_dir_all(parent)?;
                }
                fs.write(path, render_cookie_file(&cookies).as_bytes())?;
                fs.set_permissions(path, COOKIE_FILE_MODE)
                    .with_context(|| format!("securing {}", path.display()))?;
                reporter.success(&format!("session saved to {}", path.display()));
            }
            Ok(cookies)
        }
        LoginOutcome::Rejected => bail!("login rejected for {}", creds.profile.email),
        LoginOutcome::Unexpected { status } => {
            reporter.warn(&format!("login returned HTTP {status}; no session stored"));
            Ok(Vec::new())
        }
    }
}
