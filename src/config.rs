//! Console server configuration.

use std::{net::SocketAddr, time::Duration};

use console_auth::{GateConfig, DEFAULT_SIGN_IN_PATH};
use thiserror::Error;
use url::Url;

use crate::{
    logging::LoggingConfig,
    middleware::{EdgeInterceptorConfig, DEFAULT_UPLOAD_PREFIX},
    routes::pages::PROTECTED_SECTIONS,
};

const RESERVED_PATHS: [&str; 2] = ["/", "/health"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be an absolute path other than '/', got '{value}'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{field} must be an http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("no session source configured: set an auth provider URL or enable the dev session")]
    MissingSessionSource,

    #[error("{field} '{value}' contains route pattern characters")]
    RoutePattern { field: &'static str, value: String },

    #[error("{field} '{path}' collides with another console route")]
    RouteConflict { field: &'static str, path: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub host: String,
    pub port: u16,
    /// Path prefix of the upload-proxy namespace.
    pub upload_prefix: String,
    /// Upload backend that requests under `upload_prefix` are forwarded to.
    pub upload_backend_url: Option<String>,
    pub upload_timeout: Duration,
    pub sign_in_path: String,
    /// Origin of the auth provider serving `/api/auth/session`.
    pub auth_url: Option<String>,
    pub session_timeout: Duration,
    /// Gate with a fixed signed-in user instead of the auth provider.
    pub dev_session: bool,
    pub log: LoggingConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            upload_backend_url: None,
            upload_timeout: Duration::from_secs(30),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            auth_url: None,
            session_timeout: Duration::from_secs(5),
            dev_session: false,
            log: LoggingConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge = self.edge_config()?;
        self.bind_addr()?;

        if !self.sign_in_path.starts_with('/') {
            return Err(ConfigError::InvalidPath {
                field: "sign_in_path",
                value: self.sign_in_path.clone(),
            });
        }
        check_literal_route("sign_in_path", &self.sign_in_path)?;
        let sign_in = self.sign_in_path.as_str();
        if RESERVED_PATHS.contains(&sign_in)
            || PROTECTED_SECTIONS.contains(&sign_in)
            || edge.matches(sign_in)
        {
            return Err(ConfigError::RouteConflict {
                field: "sign_in_path",
                path: self.sign_in_path.clone(),
            });
        }
        if let Some(path) = RESERVED_PATHS
            .iter()
            .chain(PROTECTED_SECTIONS.iter())
            .find(|path| edge.matches(path))
        {
            return Err(ConfigError::RouteConflict {
                field: "upload_prefix",
                path: path.to_string(),
            });
        }

        if let Some(url) = &self.upload_backend_url {
            validate_http_url("upload_backend_url", url)?;
        }
        match &self.auth_url {
            Some(url) => {
                validate_http_url("auth_url", url)?;
            }
            None if !self.dev_session => return Err(ConfigError::MissingSessionSource),
            None => {}
        }

        if self.session_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                field: "session_timeout",
            });
        }
        if self.upload_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                field: "upload_timeout",
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(format!("{}:{}", self.host, self.port)))
    }

    pub fn edge_config(&self) -> Result<EdgeInterceptorConfig, ConfigError> {
        EdgeInterceptorConfig::new(&self.upload_prefix)
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new(self.sign_in_path.clone())
    }
}

/// Reject paths that the router would parse as captures or wildcards.
pub(crate) fn check_literal_route(field: &'static str, path: &str) -> Result<(), ConfigError> {
    let is_pattern = path.contains(['{', '}', '*'])
        || path.split('/').any(|segment| segment.starts_with(':'));
    if is_pattern {
        return Err(ConfigError::RoutePattern {
            field,
            value: path.to_string(),
        });
    }
    Ok(())
}

fn validate_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid());
    }
    if url.host().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
