//! Error types with Axum response mapping.
//!
//! Guard denials and service errors both render as JSON. A denial is never
//! surfaced as a fault: it always becomes a 403 with a `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Why the origin guard refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// `Referer` could not be parsed into an origin.
    #[error("Invalid HTTP referrer.")]
    MalformedReferer,

    /// `Referer` origin differs from the request's own origin.
    #[error("Invalid HTTP referrer.")]
    OriginMismatch,

    #[error("Missing XSRF token.")]
    MissingToken,

    #[error("Invalid XSRF token.")]
    InvalidToken,
}

impl DenyReason {
    /// Short machine name used in security events.
    pub fn kind(&self) -> &'static str {
        match self {
            DenyReason::MalformedReferer => "malformed_referer",
            DenyReason::OriginMismatch => "origin_mismatch",
            DenyReason::MissingToken => "missing_token",
            DenyReason::InvalidToken => "invalid_token",
        }
    }
}

impl IntoResponse for DenyReason {
    fn into_response(self) -> Response {
        let status = StatusCode::FORBIDDEN;
        let body = json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"status": 500, "message": "Internal server error"}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
