//! Session and XSRF cookies.
//!
//! Session cookie value: `base64url(session_id).base64url(hmac_signature)`.
//! The HMAC covers only the session id; nothing else is kept client-side.

use axum::http::HeaderMap;
use axum::http::header;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session_id";

/// Cookie the front end reads and echoes back in `X-XSRF-TOKEN`.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Cookie attributes shared by everything this service sets.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secret: String,
    pub https_only: bool,
    pub max_age_secs: u64,
}

impl CookieSettings {
    /// `Set-Cookie` value carrying a signed session id.
    pub fn session_cookie(&self, session_id: &str) -> String {
        let signed = sign_session_id(self.secret.as_bytes(), session_id);
        let mut parts = vec![
            format!("{}={}", SESSION_COOKIE, signed),
            format!("Max-Age={}", self.max_age_secs),
            "Path=/".into(),
            "HttpOnly".into(),
            "SameSite=Lax".into(),
        ];
        if self.https_only {
            parts.push("Secure".into());
        }
        parts.join("; ")
    }

    /// `Set-Cookie` value exposing the XSRF token to scripts (no HttpOnly).
    pub fn xsrf_cookie(&self, token: &str) -> String {
        let mut parts = vec![
            format!("{}={}", XSRF_COOKIE, token),
            "Path=/".into(),
            "SameSite=Strict".into(),
        ];
        if self.https_only {
            parts.push("Secure".into());
        }
        parts.join("; ")
    }

    /// `Set-Cookie` value expiring `name` immediately.
    pub fn expired_cookie(&self, name: &str) -> String {
        let mut parts = vec![
            format!("{}=", name),
            "Max-Age=0".into(),
            "Path=/".into(),
        ];
        if name == SESSION_COOKIE {
            parts.push("HttpOnly".into());
        }
        if self.https_only {
            parts.push("Secure".into());
        }
        parts.join("; ")
    }

    /// Session id from the request's session cookie, if present and
    /// correctly signed.
    pub fn requested_session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|h| parse_cookie(h, SESSION_COOKIE))
            .and_then(|v| verify_cookie(self.secret.as_bytes(), v))
    }
}

/// Sign a session id, returning the cookie value.
pub fn sign_session_id(secret: &[u8], session_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is always valid");
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();

    let id_encoded = URL_SAFE_NO_PAD.encode(session_id.as_bytes());
    let sig_encoded = URL_SAFE_NO_PAD.encode(signature);

    format!("{}.{}", id_encoded, sig_encoded)
}

/// Verify a signed cookie value and extract the session id.
///
/// Returns `None` if the signature is invalid or the format is wrong.
pub fn verify_cookie(secret: &[u8], cookie_value: &str) -> Option<String> {
    let (id_part, sig_part) = cookie_value.split_once('.')?;

    let id_bytes = URL_SAFE_NO_PAD.decode(id_part).ok()?;
    let session_id = String::from_utf8(id_bytes).ok()?;

    let expected_sig = URL_SAFE_NO_PAD.decode(sig_part).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is always valid");
    mac.update(session_id.as_bytes());

    mac.verify_slice(&expected_sig).ok()?;

    Some(session_id)
}

/// Parse a specific cookie from a Cookie header value.
fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}
