//! Origin guard: request-origin and XSRF filtering for the feedback web API.
//!
//! Every request under `/webapi` passes through [`guard::OriginGuard`]
//! before reaching a handler. Same-origin is checked via `Referer`;
//! `POST`/`PUT`/`DELETE` must also echo the per-session XSRF token that
//! `GET /webapi/auth` hands out.

pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod ocsf;
pub mod routes;
pub mod session;
pub mod types;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::guard::OriginGuard;
use crate::session::SessionProvider;
use crate::session::cookie::CookieSettings;
use crate::session::memory::InMemorySessions;

/// Prefix of every route behind the origin guard.
pub const API_PREFIX: &str = "/webapi";

/// Shared application state available to all route handlers.
pub struct AppState {
    pub config: Config,
    pub guard: OriginGuard,
    pub sessions: Arc<dyn SessionProvider>,
    pub cookies: CookieSettings,
}

impl AppState {
    /// State with an explicit session provider.
    pub fn new(config: Config, sessions: Arc<dyn SessionProvider>) -> Self {
        let cookies = CookieSettings {
            secret: config.session_secret.clone(),
            https_only: config.session_https_only,
            max_age_secs: config.session_max_age_secs,
        };
        Self {
            guard: OriginGuard::new(config.guard()),
            sessions,
            cookies,
            config,
        }
    }

    /// State backed by the in-memory session registry.
    pub fn in_memory(config: Config) -> Self {
        let max_age = Duration::from_secs(config.session_max_age_secs);
        Self::new(config, Arc::new(InMemorySessions::with_max_age(max_age)))
    }
}

/// Build the Axum router with all middleware and routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/auth", get(routes::auth::auth_info))
        .route("/auth/logout", post(routes::auth::logout))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::origin_check::origin_check,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest(API_PREFIX, api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
