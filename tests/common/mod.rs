//! Test utilities: app builder and request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use origin_guard::config::Config;
use origin_guard::session::cookie::sign_session_id;
use origin_guard::{AppState, create_app};
use std::sync::Arc;

pub const HOST: &str = "app.example.com";
pub const SAME_ORIGIN: &str = "http://app.example.com/web/instructor/home";

/// Build a test app with the in-memory session registry.
pub fn build_test_app() -> (axum::Router, Arc<AppState>) {
    build_test_app_with_config(Config::test_default())
}

/// Build a test app with a custom Config.
pub fn build_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::in_memory(config));
    let app = create_app(state.clone());
    (app, state)
}

/// Start a request aimed at this host.
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Host", HOST)
}

/// Cookie header value carrying a signed session id.
pub fn session_cookie(state: &AppState, session_id: &str) -> String {
    format!(
        "session_id={}",
        sign_session_id(state.config.session_secret.as_bytes(), session_id)
    )
}

/// Register a live session and return its id plus the matching XSRF token.
pub fn live_session(state: &AppState) -> (String, String) {
    let id = state.sessions.get_or_create_session_id(None).id;
    let token = state.guard.expected_token(&id);
    (id, token)
}

/// A mutating request carrying a valid session cookie and XSRF token.
pub fn authenticated(state: &AppState, method: &str, uri: &str) -> Request<Body> {
    let (sid, token) = live_session(state);
    request(method, uri)
        .header("Cookie", session_cookie(state, &sid))
        .header("X-XSRF-TOKEN", token)
        .body(Body::empty())
        .unwrap()
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

/// Value of cookie `name` from a response's `Set-Cookie` headers.
pub fn cookie_value(response: &axum::response::Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|c| {
        c.split(';')
            .next()
            .and_then(|kv| kv.strip_prefix(&format!("{name}=")))
            .map(String::from)
    })
}
