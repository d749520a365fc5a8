//! Origin and XSRF validation.
//!
//! [`OriginGuard::evaluate`] runs an ordered list of independent checks and
//! stops at the first one that settles the request:
//!
//! 1. `xsrfkey` bypass: the configured key allows the request outright.
//! 2. Referer: an absent `Referer` is given the benefit of the doubt; a
//!    present one must share the request's origin (or, in dev mode, be the
//!    front-end dev server).
//! 3. XSRF token: `POST`, `PUT` and `DELETE` must carry `X-XSRF-TOKEN`
//!    equal to the token derived from the session id.
//!
//! Anything that passes all three is allowed. Evaluation is synchronous and
//! touches no shared mutable state other than the injected session provider.

pub mod origin;
pub mod token;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method};
use std::sync::Arc;

use crate::config::GuardConfig;
use crate::error::DenyReason;
use crate::session::{ResolvedSession, SessionProvider};
use origin::{RequestFacts, base_url};

const DEV_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Result of evaluating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Allow,
    Deny(DenyReason),
}

impl OriginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, OriginDecision::Allow)
    }
}

/// Decision plus what the evaluation did on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: OriginDecision,
    /// Session resolved by the token check, if it ran that far.
    pub session: Option<ResolvedSession>,
    /// The bypass key settled the request.
    pub bypassed: bool,
}

/// Outcome of a single check.
enum Step {
    Continue,
    Allow,
    Deny(DenyReason),
}

/// Per-request scratch state threaded through the checks.
struct Evaluation<'a> {
    facts: &'a RequestFacts,
    sessions: &'a dyn SessionProvider,
    session: Option<ResolvedSession>,
}

type Check = fn(&OriginGuard, &mut Evaluation<'_>) -> Step;

const CHECKS: [(&str, Check); 3] = [
    ("bypass", OriginGuard::check_bypass),
    ("referer", OriginGuard::check_referer),
    ("xsrf_token", OriginGuard::check_xsrf_token),
];

/// Request-origin and anti-CSRF guard. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OriginGuard {
    config: Arc<GuardConfig>,
}

impl OriginGuard {
    pub fn new(config: Arc<GuardConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decide whether `facts` may reach the application.
    pub fn evaluate(&self, facts: &RequestFacts, sessions: &dyn SessionProvider) -> Verdict {
        let mut eval = Evaluation {
            facts,
            sessions,
            session: None,
        };

        let mut decision = OriginDecision::Allow;
        let mut bypassed = false;
        for (name, check) in CHECKS {
            match check(self, &mut eval) {
                Step::Continue => continue,
                Step::Allow => {
                    tracing::trace!(check = name, "request allowed early");
                    bypassed = name == "bypass";
                    break;
                }
                Step::Deny(reason) => {
                    tracing::trace!(check = name, reason = reason.kind(), "request denied");
                    decision = OriginDecision::Deny(reason);
                    break;
                }
            }
        }

        Verdict {
            decision,
            session: eval.session,
            bypassed,
        }
    }

    /// Dev mode only: permissive CORS for the front-end dev server.
    ///
    /// Applied to every guarded response, allowed or denied.
    pub fn apply_cors(&self, headers: &mut HeaderMap) {
        if !self.config.dev_mode {
            return;
        }
        match HeaderValue::from_str(&self.config.frontend_dev_url) {
            Ok(origin) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            }
            Err(_) => tracing::warn!(
                frontend_dev_url = %self.config.frontend_dev_url,
                "front-end dev URL is not a valid header value"
            ),
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(DEV_ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    /// Token the client must present for `session_id`.
    pub fn expected_token(&self, session_id: &str) -> String {
        token::session_token(self.config.csrf_secret.as_bytes(), session_id)
    }

    fn check_bypass(&self, eval: &mut Evaluation<'_>) -> Step {
        match (&self.config.xsrf_key, &eval.facts.bypass_key) {
            (Some(key), Some(presented)) if token::tokens_match(key, presented) => Step::Allow,
            _ => Step::Continue,
        }
    }

    fn check_referer(&self, eval: &mut Evaluation<'_>) -> Step {
        // Browsers with referrers disabled for privacy still get through.
        let Some(referer) = eval.facts.referer.as_deref() else {
            return Step::Continue;
        };

        let Ok(origin) = base_url(referer) else {
            return Step::Deny(DenyReason::MalformedReferer);
        };

        // Front-end dev server calling the back-end dev server.
        if self.config.dev_mode && origin == self.config.frontend_dev_url {
            return Step::Continue;
        }

        match base_url(&eval.facts.request_url) {
            Ok(target) if target == origin => Step::Continue,
            _ => Step::Deny(DenyReason::OriginMismatch),
        }
    }

    fn check_xsrf_token(&self, eval: &mut Evaluation<'_>) -> Step {
        if !is_state_changing(&eval.facts.method) {
            return Step::Continue;
        }

        let Some(presented) = eval.facts.xsrf_token.as_deref() else {
            return Step::Deny(DenyReason::MissingToken);
        };

        let session = eval
            .sessions
            .get_or_create_session_id(eval.facts.requested_session_id.as_deref());
        let expected = self.expected_token(&session.id);
        eval.session = Some(session);

        if token::tokens_match(&expected, presented) {
            Step::Continue
        } else {
            Step::Deny(DenyReason::InvalidToken)
        }
    }
}

/// Methods that require an XSRF token.
pub fn is_state_changing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}
