//! Axum integration for the session gate.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    gate::{GateDecision, SessionGate},
    session::{Session, User},
};

/// Gate a route subtree.
///
/// Unauthenticated requests get a temporary redirect to the sign-in path and the
/// wrapped handlers never run. Authenticated requests carry their [`Session`] in
/// request extensions for [`CurrentSession`] to pick up.
pub async fn session_gate_middleware(
    State(gate): State<SessionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.check(&mut request).await {
        GateDecision::Allow(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        redirect => redirect
            .into_redirect()
            .unwrap_or_else(|| StatusCode::UNAUTHORIZED.into_response()),
    }
}

/// The session of the signed-in caller, available behind the gate.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl CurrentSession {
    pub fn user(&self) -> Option<&User> {
        self.0.user.as_ref()
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .filter(|session| session.is_authenticated())
            .cloned()
            .map(CurrentSession)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
