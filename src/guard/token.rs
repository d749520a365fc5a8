//! Per-session XSRF token.
//!
//! `token = base64url(HMAC-SHA256(secret, session_id))`. Nothing is stored:
//! the expected value is recomputed for every check.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Derive the XSRF token bound to `session_id`.
pub fn session_token(secret: &[u8], session_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is always valid");
    mac.update(session_id.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Exact string equality, evaluated in constant time for equal lengths.
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deterministic() {
        assert_eq!(session_token(b"k", "session-1"), session_token(b"k", "session-1"));
    }

    #[test]
    fn test_distinct_sessions_distinct_tokens() {
        let tokens: HashSet<String> = (0..200)
            .map(|i| session_token(b"k", &format!("session-{i}")))
            .collect();
        assert_eq!(tokens.len(), 200);
    }

    #[test]
    fn test_secret_changes_token() {
        assert_ne!(session_token(b"a", "sid"), session_token(b"b", "sid"));
    }

    #[test]
    fn test_token_shape() {
        let token = session_token(b"k", "sid");
        // 32-byte MAC, base64url without padding
        assert_eq!(token.len(), 43);
        assert!(!token.contains(['=', '+', '/']));
    }

    #[test]
    fn test_tokens_match() {
        let token = session_token(b"k", "sid");
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, &token[..42]));
        assert!(!tokens_match(&token, ""));
        assert!(!tokens_match(&token, &session_token(b"k", "other")));
    }
}
