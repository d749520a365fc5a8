//! Server-side sessions.
//!
//! The origin guard never touches a session store directly. It asks a
//! [`SessionProvider`] for the current session id, which may mint one.
//! Session ids travel in an HMAC-signed cookie (see [`cookie`]).

pub mod cookie;
pub mod extract;
pub mod memory;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Outcome of a session lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub id: String,
    /// `true` when the provider minted this session during the lookup, so
    /// the client has not seen its cookie yet.
    pub created: bool,
}

/// Source of session identifiers for the guard and route handlers.
///
/// Implementations must be `Send + Sync`; they are shared across every
/// in-flight request.
pub trait SessionProvider: Send + Sync {
    /// Return the requested session if it is live, otherwise start a new one.
    fn get_or_create_session_id(&self, requested: Option<&str>) -> ResolvedSession;

    /// Forget a session. Unknown ids are ignored.
    fn end_session(&self, session_id: &str);
}

/// Fresh random session id: 32 bytes, base64url without padding.
pub fn generate_session_id() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
