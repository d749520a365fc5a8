//! Session extractor for route handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;

use super::{ResolvedSession, SessionProvider};
use crate::AppState;

/// The caller's session, created on demand.
///
/// Reuses the session the origin guard already resolved when there is
/// one. That session's cookie is the guard's business, so it is reported
/// with `created == false`; handlers only set the cookie for sessions
/// minted here.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub ResolvedSession);

impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<ResolvedSession>() {
            return Ok(Self(ResolvedSession {
                id: session.id.clone(),
                created: false,
            }));
        }

        let requested = state.cookies.requested_session_id(&parts.headers);
        let sessions: &dyn SessionProvider = state.sessions.as_ref();
        Ok(Self(sessions.get_or_create_session_id(requested.as_deref())))
    }
}
