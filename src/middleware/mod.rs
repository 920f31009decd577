//! Request middleware for the admin console.
//!
//! The session gate lives in the `console-auth` crate; this module holds the
//! edge interceptor that runs ahead of routing.

pub mod edge;

pub use edge::{
    edge_interceptor_middleware, upload_cors_headers, EdgeInterceptor, EdgeInterceptorConfig,
    DEFAULT_UPLOAD_PREFIX,
};
