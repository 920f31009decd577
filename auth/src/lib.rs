//! Session gating for the admin console.
//!
//! This crate provides:
//! - The session model handed out by the external auth provider
//! - Session resolvers (HTTP-backed and static)
//! - A session gate that redirects unauthenticated requests to sign-in
//! - Middleware and extractors for protected route subtrees

mod gate;
mod middleware;
mod resolver;
mod session;

pub use gate::{GateConfig, GateDecision, ResolvedSession, SessionGate, DEFAULT_SIGN_IN_PATH};
pub use middleware::{session_gate_middleware, CurrentSession};
pub use resolver::{
    HttpSessionResolver, SessionResolver, StaticSessionResolver, SESSION_ENDPOINT_PATH,
};
pub use session::{Session, SessionError, User};
