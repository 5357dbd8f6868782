//! Session cookie handling.
//!
//! The browser carries only an opaque session id; all state stays on the server.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// Name of the cookie holding the session id.
pub const SESSION_COOKIE: &str = "urinalysis_session";

/// Reads the session id from the request's `Cookie` headers.
///
/// Returns `None` when the cookie is missing or does not hold a UUID.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Adds a `Set-Cookie` header binding the browser to session `id`.
///
/// No `Max-Age`: the cookie lives as long as the browser session does.
pub fn set_session(headers: &mut HeaderMap, id: Uuid) {
    append(
        headers,
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id),
    );
}

/// Adds a `Set-Cookie` header removing the session cookie.
pub fn clear_session(headers: &mut HeaderMap) {
    append(
        headers,
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE),
    );
}

fn append(headers: &mut HeaderMap, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("invalid Set-Cookie value: {:?}", e),
    }
}
