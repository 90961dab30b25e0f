//! reqwest-backed HTTP adapters: health probe, credential delivery and login.

use std::time::Duration;

use anyhow::{Context, Result};
use n8n_deploy_common::{CredentialWebhookPayload, LoginRequest, SecretNoteRequest};
use reqwest::Client;
use reqwest::header::SET_COOKIE;

use crate::application::ports::{CredentialChannel, HttpReply, ReadinessProbe, SessionClient};
use crate::domain::session::LoginOutcome;

/// Timeout of a single health probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for notification and login requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client with the given overall timeout. Redirects are not followed.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("n8n-deploy/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")
}

/// GET a URL; any 2xx means ready.
pub struct HttpHealthProbe {
    client: Client,
    url: String,
}

impl HttpHealthProbe {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(PROBE_TIMEOUT)?,
            url: url.to_string(),
        })
    }
}

impl ReadinessProbe for HttpHealthProbe {
    async fn is_ready(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "health probe failed");
                false
            }
        }
    }
}

/// Credential delivery over HTTPS.
pub struct HttpCredentialChannel {
    client: Client,
}

impl HttpCredentialChannel {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
        })
    }
}

async fn reply(resp: reqwest::Response) -> Result<HttpReply> {
    let status = resp.status().as_u16();
    let body = resp.text().await.context("reading response body")?;
    Ok(HttpReply { status, body })
}

impl CredentialChannel for HttpCredentialChannel {
    async fn create_secret_note(&self, url: &str, note: &SecretNoteRequest) -> Result<HttpReply> {
        let resp = self
            .client
            .post(url)
            .json(note)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        reply(resp).await
    }

    async fn post_webhook(
        &self,
        url: &str,
        access_key: &str,
        application: &str,
        payload: &CredentialWebhookPayload,
    ) -> Result<HttpReply> {
        let resp = self
            .client
            .post(url)
            .header("X-Access-Key", access_key)
            .header("X-Application", application)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        reply(resp).await
    }
}

/// Logs into n8n's REST API.
pub struct HttpSessionClient {
    client: Client,
}

impl HttpSessionClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client(REQUEST_TIMEOUT)?,
        })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SessionClient for HttpSessionClient {
    async fn login(&self, base_url: &str, request: &LoginRequest) -> Result<LoginOutcome> {
        let url = format!("{}/rest/login", base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let status = resp.status().as_u16();
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        Ok(LoginOutcome::from_response(
            status,
            set_cookies.iter().map(String::as_str),
        ))
    }
}
