//! Login session cookies: classification, parsing and the cookie file format.

use serde::Serialize;

/// A cookie captured from a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

/// Result of `POST /rest/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// 200 with the cookies the application set.
    Authenticated { cookies: Vec<SessionCookie> },
    /// 401: the credentials were refused.
    Rejected,
    /// Any other status.
    Unexpected { status: u16 },
}

impl LoginOutcome {
    /// Map a response status and its `Set-Cookie` values to an outcome.
    #[must_use]
    pub fn from_response<'a>(status: u16, set_cookies: impl IntoIterator<Item = &'a str>) -> Self {
        match status {
            200 => Self::Authenticated {
                cookies: set_cookies.into_iter().filter_map(parse_set_cookie).collect(),
            },
            401 => Self::Rejected,
            status => Self::Unexpected { status },
        }
    }
}

/// Whether a cookie name looks like an application session cookie.
#[must_use]
pub fn is_auth_cookie_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["auth", "session", "n8n"].iter().any(|k| lower.contains(k))
}

/// Extract `name=value` from a `Set-Cookie` header value, ignoring attributes.
#[must_use]
pub fn parse_set_cookie(header: &str) -> Option<SessionCookie> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(SessionCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

/// Parse a request `Cookie` header into ordered pairs.
#[must_use]
pub fn parse_cookie_header(header: &str) -> Vec<SessionCookie> {
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| SessionCookie {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

/// Overlay `cached` onto `incoming`: same-named cookies take the cached value,
/// others are appended. Order of `incoming` is kept.
#[must_use]
pub fn merge_cookies(incoming: &[SessionCookie], cached: &[SessionCookie]) -> Vec<SessionCookie> {
    let mut merged: Vec<SessionCookie> = incoming.to_vec();
    for c in cached {
        match merged.iter_mut().find(|m| m.name == c.name) {
            Some(existing) => existing.value.clone_from(&c.value),
            None => merged.push(c.clone()),
        }
    }
    merged
}

/// Render cookies as a `Cookie` request header value.
#[must_use]
pub fn render_cookie_header(cookies: &[SessionCookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cookie file contents: one `name=value` per line.
#[must_use]
pub fn render_cookie_file(cookies: &[SessionCookie]) -> String {
    let mut out = String::new();
    for c in cookies {
        out.push_str(&c.name);
        out.push('=');
        out.push_str(&c.value);
        out.push('\n');
    }
    out
}

/// Drop any `Domain=` attribute so a forwarded cookie binds to the proxy host.
#[must_use]
pub fn strip_cookie_domain(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .map(str::trim)
        .filter(|attr| !attr.to_ascii_lowercase().starts_with("domain="))
        .collect::<Vec<_>>()
        .join("; ")
}
