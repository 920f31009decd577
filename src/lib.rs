//! Admin console edge server.
//!
//! Serves the admin console's protected sections behind a session gate and relays
//! the upload-proxy namespace to the upload backend, attaching the CORS headers
//! browsers need for it.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod server;

pub use config::{ConfigError, ConsoleConfig};
pub use server::{build_app, session_resolver, startup};
