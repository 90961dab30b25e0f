//! Credential notification helpers: URL normalisation and secret-note
//! response parsing.

/// Remove every `/api` path segment from a URL.
///
/// Only whole segments are removed: `https://otn.example/api/notes` becomes
/// `https://otn.example/notes`, while `https://x/api-docs` is left alone.
#[must_use]
pub fn strip_api_segment(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => return url.to_string(),
    };
    // Keep query and fragment out of the segment split.
    let (path, suffix) = match path.find(['?', '#']) {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    };

    let kept: Vec<&str> = path.split('/').filter(|seg| *seg != "api").collect();
    let mut path = kept.join("/");
    if path.is_empty() {
        path.push('/');
    }

    match scheme {
        Some(scheme) => format!("{scheme}://{authority}{path}{suffix}"),
        None => format!("{authority}{path}{suffix}"),
    }
}

/// Pull the shareable link out of a secret-note service response body.
///
/// Accepted shapes, in order: a JSON object with `url`, `credential_url` or
/// `link`; a JSON string; plain text starting with `http`. Anything else
/// falls back to `fallback`. The result always has `/api` segments removed.
#[must_use]
pub fn extract_credential_link(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    let link = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["url", "credential_url", "link"]
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()).map(str::to_string)),
        Ok(serde_json::Value::String(s)) => Some(s),
        _ if trimmed.starts_with("http") => Some(trimmed.to_string()),
        _ => None,
    };
    strip_api_segment(&link.unwrap_or_else(|| fallback.to_string()))
}
