//! Service entrypoint.
//!
//! Loads `.env` when present, reads configuration, and serves the API.
//! Logs are JSON with `LOG_FORMAT=json`, human-readable otherwise.

use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use origin_guard::config::Config;
use origin_guard::{AppState, create_app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    if config.dev_mode {
        tracing::warn!(
            frontend_dev_url = %config.frontend_dev_url,
            "dev mode: permissive CORS enabled"
        );
    }
    if config.xsrf_key.is_none() {
        tracing::info!("XSRF_KEY not set; bypass key disabled");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::in_memory(config));
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
