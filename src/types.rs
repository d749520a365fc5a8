//! Shared response DTOs.

use serde::Serialize;

/// GET /health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub dev_mode: bool,
}

/// GET /webapi/auth response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfoResponse {
    /// Value to echo in `X-XSRF-TOKEN` on mutating requests.
    pub xsrf_token: String,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
