//! services/portal/src/web/session.rs
//!
//! Cookie plumbing for the opaque, server-side-validated session token.
//! The browser only ever holds the token; patient id and flash message live
//! in the sessions table.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use portal_core::domain::Session;
use portal_core::ports::{PortResult, PortalDatabase};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "portal_session";

/// Extracts the session token from the request's Cookie header, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        c.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(|v| v.to_string())
    })
}

/// Builds the Set-Cookie value for a session token.
pub fn session_cookie(session_id: &str, ttl_days: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        Duration::days(ttl_days).num_seconds()
    )
}

/// Builds the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Expiry timestamp for a session created now.
pub fn session_expiry(ttl_days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(ttl_days)
}

/// Mints a fresh opaque session token.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Loads the live session referenced by the request's cookie, if any.
/// An expired or unknown token reads as no session.
pub async fn load_session(
    db: &dyn PortalDatabase,
    headers: &HeaderMap,
) -> PortResult<Option<Session>> {
    match session_id_from_headers(headers) {
        Some(id) => db.get_session(&id).await,
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; portal_session=abc-123; lang=en");
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn no_cookie_header_yields_none() {
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn similarly_named_cookie_is_not_matched() {
        let headers = headers_with_cookie("portal_session_old=zzz");
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn cookie_round_trips_through_builder_and_parser() {
        let id = new_session_id();
        let set_cookie = session_cookie(&id, 30);
        let pair = set_cookie.split(';').next().unwrap();
        let headers = headers_with_cookie(pair);
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }
}
