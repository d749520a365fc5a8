//! OCSF (Open Cybersecurity Schema Framework) structured event logging.
//!
//! Guard decisions worth auditing are emitted as HTTP Activity (4002)
//! events via `tracing::info!` on target `ocsf`. Never panics; serialization
//! errors are swallowed. Secrets and tokens are never included.

use axum::http::Method;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::DenyReason;

// OCSF event class UIDs
pub const CLASS_HTTP_ACTIVITY: u32 = 4002;

// HTTP Activity activity IDs
pub const ACTIVITY_CONNECT: u32 = 1;
pub const ACTIVITY_DELETE: u32 = 2;
pub const ACTIVITY_GET: u32 = 3;
pub const ACTIVITY_HEAD: u32 = 4;
pub const ACTIVITY_OPTIONS: u32 = 5;
pub const ACTIVITY_POST: u32 = 6;
pub const ACTIVITY_PUT: u32 = 7;
pub const ACTIVITY_TRACE: u32 = 8;
pub const ACTIVITY_OTHER: u32 = 99;

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Action IDs
pub const ACTION_ALLOWED: u32 = 1;
pub const ACTION_DENIED: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;
pub const SEVERITY_HIGH: u32 = 4;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        SEVERITY_HIGH => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

/// OCSF activity for an HTTP method.
pub fn activity_from_method(method: &Method) -> (u32, &'static str) {
    match *method {
        Method::CONNECT => (ACTIVITY_CONNECT, "Connect"),
        Method::DELETE => (ACTIVITY_DELETE, "Delete"),
        Method::GET => (ACTIVITY_GET, "Get"),
        Method::HEAD => (ACTIVITY_HEAD, "Head"),
        Method::OPTIONS => (ACTIVITY_OPTIONS, "Options"),
        Method::POST => (ACTIVITY_POST, "Post"),
        Method::PUT => (ACTIVITY_PUT, "Put"),
        Method::TRACE => (ACTIVITY_TRACE, "Trace"),
        _ => (ACTIVITY_OTHER, "Other"),
    }
}

/// Emit an OCSF event as structured JSON via tracing. Never panics.
fn emit(event: &serde_json::Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "ocsf", "{}", json);
    }
}

/// Build an HTTP Activity (4002) event.
fn http_activity(
    method: &Method,
    path: &str,
    status_id: u32,
    action_id: u32,
    severity_id: u32,
    response_code: Option<u16>,
    message: &str,
) -> serde_json::Value {
    let (activity_id, activity_name) = activity_from_method(method);
    let action = if action_id == ACTION_ALLOWED {
        "Allowed"
    } else {
        "Denied"
    };
    let mut event = json!({
        "class_uid": CLASS_HTTP_ACTIVITY,
        "class_name": "HTTP Activity",
        "activity_id": activity_id,
        "activity_name": activity_name,
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "action_id": action_id,
        "action": action,
        "time": now_millis(),
        "metadata": {
            "product": {
                "name": "origin-guard",
                "version": env!("CARGO_PKG_VERSION"),
                "vendor_name": "TEAMMATES"
            }
        },
        "http_request": {
            "http_method": method.as_str(),
            "url": { "path": path }
        },
        "message": message,
    });

    if let Some(code) = response_code {
        event["http_response"] = json!({ "code": code });
    }

    event
}

/// A request refused by the origin guard.
pub fn origin_denied_event(method: &Method, path: &str, reason: DenyReason, had_referer: bool) {
    let mut event = http_activity(
        method,
        path,
        STATUS_FAILURE,
        ACTION_DENIED,
        SEVERITY_MEDIUM,
        Some(403),
        &reason.to_string(),
    );
    event["status_detail"] = json!(reason.kind());
    event["unmapped"] = json!({ "referer_present": had_referer });
    emit(&event);
}

/// A request admitted through the `xsrfkey` bypass.
pub fn bypass_event(method: &Method, path: &str) {
    let event = http_activity(
        method,
        path,
        STATUS_SUCCESS,
        ACTION_ALLOWED,
        SEVERITY_MEDIUM,
        None,
        "Origin and XSRF checks bypassed with operator key",
    );
    emit(&event);
}
