use std::time::Duration;

use axum::http::{HeaderMap, header};

use crate::management::SESSION_TTL_DAYS;

pub const SESSION_COOKIE_NAME: &str = "albumshuffle_sid";
pub const SESSION_COOKIE_PATH: &str = "/";

pub fn session_max_age() -> Duration {
    Duration::from_secs(SESSION_TTL_DAYS as u64 * 24 * 60 * 60)
}

pub fn build_session_cookie(value: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME,
        value,
        SESSION_COOKIE_PATH,
        max_age.as_secs(),
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_cookie(secure: bool) -> String {
    build_session_cookie("", Duration::ZERO, secure)
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// The session id from any `Cookie` header on the request.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| extract_cookie_value(value, SESSION_COOKIE_NAME))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_includes_security_attributes() {
        let cookie = build_session_cookie("abc", session_max_age(), true);
        assert!(cookie.starts_with("albumshuffle_sid=abc"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn clear_cookie_sets_max_age_zero() {
        let cookie = build_clear_cookie(false);
        assert!(cookie.starts_with("albumshuffle_sid=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("a=1; albumshuffle_sid=sid-value; b=2"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("sid-value"));

        let mut empty = HeaderMap::new();
        empty.append(header::COOKIE, HeaderValue::from_static("albumshuffle_sid="));
        assert!(session_id(&empty).is_none());
        assert!(session_id(&HeaderMap::new()).is_none());
    }
}
