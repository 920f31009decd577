//! Session gate for protected route subtrees.
//!
//! The gate resolves the caller's session once and decides whether the subtree may
//! render. A missing session, a session without a user, and a failed resolver all
//! redirect to the sign-in path.

use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::{
    resolver::SessionResolver,
    session::{Session, SessionError},
};

pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub sign_in_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }
}

impl GateConfig {
    pub fn new(sign_in_path: impl Into<String>) -> Self {
        Self {
            sign_in_path: sign_in_path.into(),
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Session),
    Redirect(String),
}

impl GateDecision {
    /// Decide from a resolver outcome. Resolver failures are treated like an
    /// absent session.
    pub fn from_resolved(
        resolved: Result<Option<Session>, SessionError>,
        sign_in_path: &str,
    ) -> Self {
        match resolved {
            Ok(Some(session)) if session.is_authenticated() => Self::Allow(session),
            Ok(_) => Self::Redirect(sign_in_path.to_string()),
            Err(e) => {
                warn!(error = %e, "Session resolution failed, redirecting to sign-in");
                Self::Redirect(sign_in_path.to_string())
            }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn into_redirect(self) -> Option<Response> {
        match self {
            Self::Allow(_) => None,
            Self::Redirect(path) => Some(Redirect::temporary(&path).into_response()),
        }
    }
}

/// Per-request memo of the resolved session, stored in request extensions.
///
/// `None` covers both "no session" and "resolver failed".
#[derive(Debug, Clone)]
pub struct ResolvedSession(pub Option<Session>);

#[derive(Clone)]
pub struct SessionGate {
    resolver: Arc<dyn SessionResolver>,
    config: Arc<GateConfig>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    pub fn new(resolver: Arc<dyn SessionResolver>, config: GateConfig) -> Self {
        Self {
            resolver,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Check the request against the gate.
    ///
    /// The resolver runs at most once per request: later checks on the same request
    /// reuse the memo in its extensions and reach the same decision.
    pub async fn check(&self, request: &mut Request) -> GateDecision {
        if let Some(ResolvedSession(memo)) = request.extensions().get::<ResolvedSession>() {
            return GateDecision::from_resolved(Ok(memo.clone()), &self.config.sign_in_path);
        }

        let resolved = self.resolver.resolve(request.headers()).await;
        let decision = GateDecision::from_resolved(resolved, &self.config.sign_in_path);

        let memo = match &decision {
            GateDecision::Allow(session) => Some(session.clone()),
            GateDecision::Redirect(_) => None,
        };
        request.extensions_mut().insert(ResolvedSession(memo));

        if let GateDecision::Redirect(path) = &decision {
            debug!(
                path = %request.uri().path(),
                redirect = %path,
                "Unauthenticated request redirected"
            );
        }
        decision
    }
}
