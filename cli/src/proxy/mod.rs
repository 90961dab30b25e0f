//! Auto-login reverse proxy in front of n8n.
//!
//! Every visitor without a valid n8n session is handed the owner's session
//! cookies, so the editor opens without a login screen.

pub mod forward;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use n8n_deploy_common::LoginRequest;

use crate::application::services::readiness::wait_until_ready;
use crate::domain::PollPolicy;
use crate::infra::http::{HttpHealthProbe, HttpSessionClient, build_client};
use crate::output::TracingReporter;

pub use session::SessionCache;

/// Timeout for each forwarded request.
pub const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state of the proxy.
pub struct ProxyState {
    /// Upstream base URL without a trailing slash.
    pub upstream: String,
    /// Forwarding client; never follows redirects.
    pub client: reqwest::Client,
    pub session_client: HttpSessionClient,
    pub session: SessionCache,
}

impl ProxyState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(upstream: &str, login: LoginRequest) -> Result<Self> {
        let client = build_client(FORWARD_TIMEOUT)?;
        Ok(Self {
            upstream: upstream.trim_end_matches('/').to_string(),
            session_client: HttpSessionClient::with_client(client.clone()),
            client,
            session: SessionCache::new(login),
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

/// Routes: `/__proxy/health` plus a catch-all forwarder.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/__proxy/health", get(health))
        .fallback(forward::forward)
        .with_state(state)
}

/// Wait for n8n (warning only), log in once, then serve on `listener`.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<ProxyState>) -> Result<()> {
    let probe = HttpHealthProbe::new(&format!("{}/healthz", state.upstream))?;
    if let Err(e) = wait_until_ready(&probe, PollPolicy::PROXY_UPSTREAM, "n8n", &TracingReporter).await {
        tracing::warn!(error = %e, "n8n may not be ready yet, continuing anyway");
    }
    state.session.ensure(&state.session_client, &state.upstream).await;

    let addr = listener.local_addr().context("reading listener address")?;
    tracing::info!(%addr, upstream = %state.upstream, "auto-login proxy listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("proxy server failed")
}

/// Bind `listen` and run [`serve`].
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(listen: SocketAddr, upstream: &str, login: LoginRequest) -> Result<()> {
    let state = Arc::new(ProxyState::new(upstream, login)?);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding {listen}"))?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
