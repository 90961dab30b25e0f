//! Cached auto-login session shared by all proxied requests.

use n8n_deploy_common::LoginRequest;
use tokio::sync::Mutex;

use crate::application::ports::SessionClient;
use crate::domain::session::{LoginOutcome, SessionCookie};

/// Owner login plus the cookies it produced.
pub struct SessionCache {
    login: LoginRequest,
    cookies: Mutex<Vec<SessionCookie>>,
}

impl SessionCache {
    #[must_use]
    pub fn new(login: LoginRequest) -> Self {
        Self {
            login,
            cookies: Mutex::new(Vec::new()),
        }
    }

    /// Current cookies, possibly empty.
    pub async fn snapshot(&self) -> Vec<SessionCookie> {
        self.cookies.lock().await.clone()
    }

    /// Cached cookies, logging in first when none are cached.
    ///
    /// A failed login leaves the cache empty and is retried on the next call.
    pub async fn ensure(&self, client: &impl SessionClient, upstream: &str) -> Vec<SessionCookie> {
        let mut cookies = self.cookies.lock().await;
        if !cookies.is_empty() {
            return cookies.clone();
        }
        tracing::info!(email = %self.login.email, "logging in to n8n");
        match client.login(upstream, &self.login).await {
            Ok(LoginOutcome::Authenticated { cookies: fresh }) => {
                let names: Vec<&str> = fresh.iter().map(|c| c.name.as_str()).collect();
                tracing::info!(cookies = ?names, "auto-login succeeded");
                cookies.clone_from(&fresh);
            }
            Ok(LoginOutcome::Rejected) => tracing::warn!("auto-login rejected by n8n"),
            Ok(LoginOutcome::Unexpected { status }) => {
                tracing::warn!(status, "auto-login returned unexpected status");
            }
            Err(e) => tracing::warn!(error = %e, "auto-login failed"),
        }
        cookies.clone()
    }

    /// Record cookies seen on requests or responses, replacing same-named ones.
    pub async fn remember(&self, seen: &[SessionCookie]) {
        if seen.is_empty() {
            return;
        }
        let mut cookies = self.cookies.lock().await;
        let merged = crate::domain::session::merge_cookies(&cookies, seen);
        *cookies = merged;
    }
}
