//! Request facts and origin (base URL) extraction.

use axum::extract::OriginalUri;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};
use url::Url;

pub const XSRF_HEADER: &str = "x-xsrf-token";
pub const BYPASS_PARAM: &str = "xsrfkey";

/// Everything the guard looks at, lifted out of the HTTP request.
#[derive(Debug, Clone)]
pub struct RequestFacts {
    pub method: Method,
    /// Full URL of the current request (scheme, host, path, query).
    pub request_url: String,
    pub referer: Option<String>,
    pub xsrf_token: Option<String>,
    /// Session id the client asked for, already signature-checked.
    pub requested_session_id: Option<String>,
    /// Value of the `xsrfkey` query parameter.
    pub bypass_key: Option<String>,
}

impl RequestFacts {
    /// Collect request facts. `requested_session_id` comes from the
    /// caller since decoding the session cookie needs its secret.
    pub fn from_parts(parts: &Parts, requested_session_id: Option<String>) -> Self {
        // Inside a nested router `parts.uri` has lost its prefix.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);

        Self {
            method: parts.method.clone(),
            request_url: request_url(uri, &parts.headers),
            referer: header_string(&parts.headers, "referer"),
            xsrf_token: header_string(&parts.headers, XSRF_HEADER),
            requested_session_id,
            bypass_key: uri.query().and_then(|q| query_param(q, BYPASS_PARAM)),
        }
    }
}

/// Base URL of `raw`: `scheme://host` plus `:port` for a non-default port.
pub fn base_url(raw: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(raw)?;
    let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Rebuild the absolute URL of a request.
///
/// Servers normally receive origin-form targets (`/path?query`), so the
/// scheme comes from `X-Forwarded-Proto` (default `http`) and the
/// authority from `Host`.
fn request_url(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    // Without a Host there is no target origin; a relative URL never parses.
    let Some(host) = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
    else {
        return path.to_string();
    };

    format!("{scheme}://{host}{path}")
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
