//! GET /webapi/auth and POST /webapi/auth/logout

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use std::sync::Arc;

use crate::error::AppError;
use crate::session::SessionProvider;
use crate::session::cookie::{SESSION_COOKIE, XSRF_COOKIE};
use crate::session::extract::CurrentSession;
use crate::types::{AuthInfoResponse, SuccessResponse};

/// Hand the front end its XSRF token.
///
/// The token is returned in the body and in the script-readable
/// `XSRF-TOKEN` cookie. A new session cookie is set when the session was
/// created by this request.
pub async fn auth_info(
    State(state): State<Arc<crate::AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<(HeaderMap, Json<AuthInfoResponse>), AppError> {
    let token = state.guard.expected_token(&session.id);

    let mut cookies = Vec::with_capacity(2);
    if session.created {
        cookies.push(state.cookies.session_cookie(&session.id));
    }
    cookies.push(state.cookies.xsrf_cookie(&token));

    Ok((
        set_cookie_headers(cookies)?,
        Json(AuthInfoResponse { xsrf_token: token }),
    ))
}

/// End the session and expire both cookies.
pub async fn logout(
    State(state): State<Arc<crate::AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<(HeaderMap, Json<SuccessResponse>), AppError> {
    let sessions: &dyn SessionProvider = state.sessions.as_ref();
    sessions.end_session(&session.id);
    tracing::info!("session ended");

    let headers = set_cookie_headers([
        state.cookies.expired_cookie(SESSION_COOKIE),
        state.cookies.expired_cookie(XSRF_COOKIE),
    ])?;
    Ok((headers, Json(SuccessResponse { success: true })))
}

fn set_cookie_headers(cookies: impl IntoIterator<Item = String>) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("invalid Set-Cookie value: {e}")))?;
        headers.append(SET_COOKIE, value);
    }
    Ok(headers)
}
