//! Session resolvers.
//!
//! A resolver turns the headers of an inbound request into the caller's session.
//! The auth provider owns the session; resolvers only ask it.

use std::time::Duration;

use async_trait::async_trait;
use http::{
    header::{ACCEPT, COOKIE},
    HeaderMap,
};
use url::Url;

use crate::session::{Session, SessionError};

/// Path of the provider's session endpoint, relative to its origin.
pub const SESSION_ENDPOINT_PATH: &str = "/api/auth/session";

#[async_trait]
pub trait SessionResolver: Send + Sync + 'static {
    /// Resolve the session for a request. `Ok(None)` means no session.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

/// Resolves sessions by asking the auth provider over HTTP, forwarding the
/// request's cookies.
#[derive(Debug, Clone)]
pub struct HttpSessionResolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSessionResolver {
    pub fn new(auth_url: &str, timeout: Duration) -> Result<Self, SessionError> {
        let base = Url::parse(auth_url)
            .map_err(|e| SessionError::InvalidEndpoint(format!("{auth_url}: {e}")))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(SessionError::InvalidEndpoint(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }
        let endpoint = base
            .join(SESSION_ENDPOINT_PATH)
            .map_err(|e| SessionError::InvalidEndpoint(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SessionError::Transport)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json");
        if let Some(cookie) = headers.get(COOKIE) {
            request = request.header(COOKIE, cookie.clone());
        }

        let response = request.send().await.map_err(SessionError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::UnexpectedStatus(status.as_u16()));
        }

        response
            .json::<Option<Session>>()
            .await
            .map_err(SessionError::Decode)
    }
}

/// Always returns the same session. Used for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionResolver {
    session: Option<Session>,
}

impl StaticSessionResolver {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl SessionResolver for StaticSessionResolver {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        Ok(self.session.clone())
    }
}
