//! Session model as served by the auth provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signed-in user attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A resolved session.
///
/// The provider answers `{}` for visitors without a session, which decodes to a
/// session whose `user` is `None`. Only the presence of `user` is meaningful here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl Session {
    pub fn for_user(user: User) -> Self {
        Self {
            user: Some(user),
            expires: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Session request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Session provider returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Failed to decode session: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Session provider error: {0}")]
    Provider(String),
}
