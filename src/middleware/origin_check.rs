//! Axum middleware running the origin guard in front of the API routes.

use axum::extract::{OriginalUri, Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::AppState;
use crate::guard::OriginDecision;
use crate::guard::origin::RequestFacts;
use crate::ocsf;

/// Evaluate the guard once, then either run the rest of the stack or
/// answer 403 without touching it.
///
/// A session minted while evaluating is always announced to the client,
/// even on a denied request. On allow, the resolved session is handed to
/// handlers through request extensions.
pub async fn origin_check(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let requested = state.cookies.requested_session_id(&parts.headers);
    let facts = RequestFacts::from_parts(&parts, requested);
    let verdict = state.guard.evaluate(&facts, state.sessions.as_ref());
    // Nested routers see the path with the API prefix stripped.
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());

    let mut response = match verdict.decision {
        OriginDecision::Allow => {
            if verdict.bypassed {
                tracing::warn!(
                    method = %parts.method,
                    path = %path,
                    "origin checks bypassed via xsrfkey"
                );
                ocsf::bypass_event(&parts.method, &path);
            }
            let mut req = Request::from_parts(parts, body);
            if let Some(session) = &verdict.session {
                req.extensions_mut().insert(session.clone());
            }
            next.run(req).await
        }
        OriginDecision::Deny(reason) => {
            tracing::info!(
                method = %parts.method,
                path = %path,
                reason = reason.kind(),
                "request denied by origin guard"
            );
            ocsf::origin_denied_event(
                &parts.method,
                &path,
                reason,
                facts.referer.is_some(),
            );
            reason.into_response()
        }
    };

    if let Some(session) = verdict.session.filter(|s| s.created) {
        match HeaderValue::from_str(&state.cookies.session_cookie(&session.id)) {
            Ok(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Err(e) => tracing::error!(error = %e, "session cookie is not a valid header value"),
        }
    }

    state.guard.apply_cors(response.headers_mut());
    response
}
