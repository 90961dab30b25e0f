//! Request forwarding with cookie injection.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, COOKIE, HOST, SET_COOKIE, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::domain::session::{
    SessionCookie, is_auth_cookie_name, merge_cookies, parse_cookie_header, parse_set_cookie,
    render_cookie_header, strip_cookie_domain,
};
use crate::proxy::ProxyState;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

const SKIP_REQUEST_HEADERS: [HeaderName; 4] = [HOST, CONNECTION, CONTENT_LENGTH, COOKIE];
const SKIP_RESPONSE_HEADERS: [HeaderName; 5] =
    [CONTENT_ENCODING, TRANSFER_ENCODING, CONTENT_LENGTH, CONNECTION, SET_COOKIE];

fn incoming_cookies(headers: &HeaderMap) -> Vec<SessionCookie> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_cookie_header)
        .collect()
}

/// Whether the client already holds a session n8n accepts.
async fn is_authenticated(state: &ProxyState, cookies: &[SessionCookie]) -> bool {
    if !cookies.iter().any(|c| is_auth_cookie_name(&c.name)) {
        return false;
    }
    let url = format!("{}/rest/me", state.upstream);
    match state
        .client
        .get(&url)
        .header(COOKIE, render_cookie_header(cookies))
        .send()
        .await
    {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(e) => {
            tracing::debug!(error = %e, "session check failed");
            false
        }
    }
}

fn proxy_error(err: impl std::fmt::Display) -> Response {
    tracing::warn!(error = %err, "proxy error");
    (StatusCode::BAD_GATEWAY, format!("Proxy error: {err}")).into_response()
}

/// Forward any request to n8n, logging the client in when needed.
pub async fn forward(State(state): State<Arc<ProxyState>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => return (StatusCode::BAD_REQUEST, format!("Proxy error: {e}")).into_response(),
    };

    let incoming = incoming_cookies(&parts.headers);
    let authenticated = is_authenticated(&state, &incoming).await;
    let cookies = if authenticated {
        state.session.remember(&incoming).await;
        incoming
    } else {
        let cached = state.session.ensure(&state.session_client, &state.upstream).await;
        merge_cookies(&incoming, &cached)
    };

    let path = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let url = format!("{}{path}", state.upstream);

    let mut headers = HeaderMap::new();
    for (name, value) in &parts.headers {
        if !SKIP_REQUEST_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    if !cookies.is_empty() {
        if let Ok(v) = HeaderValue::from_str(&render_cookie_header(&cookies)) {
            headers.insert(COOKIE, v);
        }
    }

    tracing::debug!(method = %parts.method, %url, authenticated, "forward");
    let upstream = match state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return proxy_error(e),
    };

    let status = upstream.status();
    let mut out_headers = HeaderMap::new();
    for (name, value) in upstream.headers() {
        if !SKIP_RESPONSE_HEADERS.contains(name) {
            out_headers.append(name.clone(), value.clone());
        }
    }

    let mut set_by_upstream: Vec<SessionCookie> = Vec::new();
    for value in upstream.headers().get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        if let Some(cookie) = parse_set_cookie(raw) {
            set_by_upstream.push(cookie);
        }
        if let Ok(v) = HeaderValue::from_str(&strip_cookie_domain(raw)) {
            out_headers.append(SET_COOKIE, v);
        }
    }
    state.session.remember(&set_by_upstream).await;

    if !authenticated {
        for cookie in state.session.snapshot().await {
            if set_by_upstream.iter().any(|c| c.name == cookie.name) {
                continue;
            }
            let line = format!("{}={}; Path=/; SameSite=Lax", cookie.name, cookie.value);
            if let Ok(v) = HeaderValue::from_str(&line) {
                out_headers.append(SET_COOKIE, v);
            }
        }
    }

    let bytes = match upstream.bytes().await {
        Ok(b) => b,
        Err(e) => return proxy_error(e),
    };
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = out_headers;
    response
}
