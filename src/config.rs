//! Application configuration via environment variables.
//!
//! Everything here is read once at startup and never mutated. The guard
//! only sees the [`GuardConfig`] slice of it.

use std::env;
use std::sync::Arc;

use crate::guard::origin::base_url;

const DEFAULT_FRONTEND_DEV_URL: &str = "http://localhost:4200";
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 3600;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub dev_mode: bool,
    pub frontend_dev_url: String,
    pub xsrf_key: Option<String>,
    pub csrf_secret: String,
    pub session_secret: String,
    pub session_https_only: bool,
    pub session_max_age_secs: u64,
    pub port: u16,
    pub log_json: bool,
}

/// Immutable settings consumed by the origin guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Non-production mode: permissive CORS and the front-end dev origin
    /// accepted as a referrer.
    pub dev_mode: bool,
    /// Origin of the front-end dev server, e.g. `http://localhost:4200`.
    pub frontend_dev_url: String,
    /// Value of the `xsrfkey` query parameter that skips every check.
    /// `None` disables the bypass.
    pub xsrf_key: Option<String>,
    /// HMAC key used to derive the per-session XSRF token.
    pub csrf_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `CSRF_SECRET`. All others have defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(key.into()))
        };

        Ok(Self {
            dev_mode: parse_bool(lookup("DEV_MODE")),
            frontend_dev_url: parse_origin("FRONTEND_DEV_URL", lookup("FRONTEND_DEV_URL"))?
                .unwrap_or_else(|| DEFAULT_FRONTEND_DEV_URL.into()),
            xsrf_key: lookup("XSRF_KEY").filter(|v| !v.is_empty()),
            csrf_secret: required("CSRF_SECRET")?,
            session_secret: lookup("SESSION_SECRET")
                .unwrap_or_else(|| "change-me-in-production".into()),
            session_https_only: parse_bool(lookup("SESSION_HTTPS_ONLY")),
            session_max_age_secs: parse_number(
                "SESSION_MAX_AGE_SECS",
                lookup("SESSION_MAX_AGE_SECS"),
                DEFAULT_SESSION_MAX_AGE_SECS,
            )?,
            port: parse_number("PORT", lookup("PORT"), 8080)?,
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// The guard's view of this configuration.
    pub fn guard(&self) -> Arc<GuardConfig> {
        Arc::new(GuardConfig {
            dev_mode: self.dev_mode,
            frontend_dev_url: self.frontend_dev_url.clone(),
            xsrf_key: self.xsrf_key.clone(),
            csrf_secret: self.csrf_secret.clone(),
        })
    }
}

/// Fixed configuration for tests.
impl Config {
    pub fn test_default() -> Self {
        Self {
            dev_mode: false,
            frontend_dev_url: DEFAULT_FRONTEND_DEV_URL.into(),
            xsrf_key: Some("test-xsrf-key".into()),
            csrf_secret: "test-csrf-secret".into(),
            session_secret: "test-session-secret".into(),
            session_https_only: false,
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            port: 8080,
            log_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

fn parse_bool(value: Option<String>) -> bool {
    value.is_some_and(|v| v == "true" || v == "1" || v == "True")
}

/// Reduce a configured URL to its origin with the rules applied to referrers.
fn parse_origin(key: &str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    match base_url(raw.trim()) {
        Ok(origin) => Ok(Some(origin)),
        Err(_) => Err(ConfigError::InvalidValue {
            key: key.into(),
            value: raw,
        }),
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.into(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_creates_valid_config() {
        let cfg = Config::test_default();
        assert!(!cfg.dev_mode);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.frontend_dev_url, "http://localhost:4200");
        assert!(!cfg.session_https_only);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[("CSRF_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.csrf_secret, "s3cret");
        assert!(!cfg.dev_mode);
        assert!(cfg.xsrf_key.is_none());
        assert_eq!(cfg.session_secret, "change-me-in-production");
        assert_eq!(cfg.session_max_age_secs, 30 * 24 * 3600);
        assert!(!cfg.log_json);
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let err = Config::from_lookup(lookup_from(&[("DEV_MODE", "true")])).unwrap_err();
        assert!(err.to_string().contains("CSRF_SECRET"));
    }

    #[test]
    fn test_empty_csrf_secret_is_missing() {
        let err = Config::from_lookup(lookup_from(&[("CSRF_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(_)));
    }

    #[test]
    fn test_empty_xsrf_key_disables_bypass() {
        let cfg = Config::from_lookup(lookup_from(&[("CSRF_SECRET", "s"), ("XSRF_KEY", "")]))
            .unwrap();
        assert!(cfg.guard().xsrf_key.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[("CSRF_SECRET", "s"), ("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_frontend_dev_url_normalized() {
        for (raw, expected) in [
            ("http://LOCALHOST:4200", "http://localhost:4200"),
            ("https://dev.example.com:443/", "https://dev.example.com"),
            ("http://localhost:4200/web/", "http://localhost:4200"),
        ] {
            let cfg = Config::from_lookup(lookup_from(&[
                ("CSRF_SECRET", "s"),
                ("FRONTEND_DEV_URL", raw),
            ]))
            .unwrap();
            assert_eq!(cfg.frontend_dev_url, expected, "{raw}");
        }
    }

    #[test]
    fn test_invalid_frontend_dev_url() {
        let err = Config::from_lookup(lookup_from(&[
            ("CSRF_SECRET", "s"),
            ("FRONTEND_DEV_URL", "localhost:4200"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FRONTEND_DEV_URL"));
    }

    #[test]
    fn test_guard_view() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("CSRF_SECRET", "s"),
            ("XSRF_KEY", "bypass"),
            ("DEV_MODE", "1"),
            ("FRONTEND_DEV_URL", "http://localhost:4200/"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        let guard = cfg.guard();
        assert!(guard.dev_mode);
        assert_eq!(guard.frontend_dev_url, "http://localhost:4200");
        assert_eq!(guard.xsrf_key.as_deref(), Some("bypass"));
        assert_eq!(guard.csrf_secret, "s");
        assert!(cfg.log_json);
    }
}
