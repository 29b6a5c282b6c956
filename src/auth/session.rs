//! Access token extraction for the passthrough endpoints.
//!
//! Browsers hold the Supabase session in cookies written by the JS clients.
//! Two layouts are understood:
//!
//! - `sb-access-token`: the raw JWT, as written by the older auth helpers.
//! - `sb-<project ref>-auth-token`: the session as JSON, optionally prefixed
//!   with `base64-` and base64url encoded, and split into `.0`, `.1`, ...
//!   chunks when it outgrows a single cookie.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};
use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use serde_json::Value;
use std::collections::HashMap;

/// Cookie written by the older Supabase auth helpers.
pub const LEGACY_SESSION_COOKIE: &str = "sb-access-token";

const BASE64_PREFIX: &str = "base64-";

// Upper bound on chunk suffixes; supabase-js never writes more than a handful.
const MAX_CHUNKS: usize = 32;

/// Cookie name the Supabase SSR clients use for a project URL host.
#[must_use]
pub fn project_session_cookie(host: &str) -> String {
    let project_ref = host.split('.').next().unwrap_or(host);
    format!("sb-{project_ref}-auth-token")
}

/// Bearer token wins over cookies. Then the configured session cookie, then
/// the legacy `sb-access-token`.
#[must_use]
pub fn extract_access_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }

    let jar = cookies(headers);

    session_cookie_value(&jar, cookie_name)
        .and_then(|value| decode_session(&value))
        .or_else(|| {
            jar.get(LEGACY_SESSION_COOKIE)
                .filter(|value| !value.is_empty())
                .map(|value| (*value).to_string())
        })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// First occurrence of a name wins.
fn cookies(headers: &HeaderMap) -> HashMap<&str, &str> {
    let mut jar = HashMap::new();
    for pair in headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
    {
        if let Some((key, value)) = pair.split_once('=') {
            jar.entry(key.trim()).or_insert_with(|| value.trim());
        }
    }
    jar
}

fn chunk_name(cookie_name: &str, index: usize) -> String {
    format!("{cookie_name}.{index}")
}

/// Whole cookie value, or the chunks joined in order.
fn session_cookie_value(jar: &HashMap<&str, &str>, cookie_name: &str) -> Option<String> {
    if let Some(value) = jar.get(cookie_name) {
        return (!value.is_empty()).then(|| (*value).to_string());
    }

    let joined: String = (0..MAX_CHUNKS)
        .map_while(|index| jar.get(chunk_name(cookie_name, index).as_str()).copied())
        .collect();

    (!joined.is_empty()).then_some(joined)
}

/// Access token inside a session cookie value.
///
/// A value that is neither `base64-` prefixed nor JSON is taken to be the
/// token itself.
fn decode_session(value: &str) -> Option<String> {
    let json = if let Some(encoded) = value.strip_prefix(BASE64_PREFIX) {
        let encoded = encoded.trim_end_matches('=');
        let bytes = Base64UrlUnpadded::decode_vec(encoded)
            .or_else(|_| Base64::decode_vec(value.trim_start_matches(BASE64_PREFIX)))
            .ok()?;
        String::from_utf8(bytes).ok()?
    } else if value.starts_with('{') || value.starts_with('[') {
        value.to_string()
    } else {
        return Some(value.to_string());
    };

    let session: Value = serde_json::from_str(&json).ok()?;
    let token = match &session {
        Value::Object(_) => session.get("access_token"),
        // Older clients stored `[access_token, refresh_token, ...]`.
        Value::Array(items) => items.first(),
        _ => None,
    }?
    .as_str()?;

    (!token.is_empty()).then(|| token.to_string())
}

/// Expire the session cookie in the browser.
///
/// # Errors
/// Returns an error if `cookie_name` is not a valid header value.
pub fn clear_session_cookie(cookie_name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}

/// Expiring `Set-Cookie` values for the configured cookie, every chunk of it
/// the request carried, and the legacy cookie when present.
#[must_use]
pub fn clear_session_cookies(headers: &HeaderMap, cookie_name: &str) -> Vec<HeaderValue> {
    let jar = cookies(headers);

    let mut names = vec![cookie_name.to_string()];
    names.extend(
        (0..MAX_CHUNKS)
            .map(|index| chunk_name(cookie_name, index))
            .filter(|name| jar.contains_key(name.as_str())),
    );
    if cookie_name != LEGACY_SESSION_COOKIE && jar.contains_key(LEGACY_SESSION_COOKIE) {
        names.push(LEGACY_SESSION_COOKIE.to_string());
    }

    names
        .iter()
        .filter_map(|name| clear_session_cookie(name).ok())
        .collect()
}
