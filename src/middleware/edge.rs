//! Edge request interceptor for the upload-proxy namespace.
//!
//! Every response under the configured prefix gets a fixed CORS header set that
//! echoes the caller's `Origin`. Everything else passes through untouched.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
        },
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::config::{check_literal_route, ConfigError};

pub const DEFAULT_UPLOAD_PREFIX: &str = "/api/edgestore";

pub const UPLOAD_ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";

pub const UPLOAD_ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
     Content-Length, Content-MD5, Content-Type, Date, X-Api-Version, edgestore-ctx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeInterceptorConfig {
    prefix: String,
}

impl Default for EdgeInterceptorConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
        }
    }
}

impl EdgeInterceptorConfig {
    /// Build from a path prefix. Trailing slashes are dropped; the prefix must be
    /// an absolute literal path and must not be the root.
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        check_literal_route("upload_prefix", prefix)?;
        if !prefix.starts_with('/') {
            return Err(ConfigError::InvalidPath {
                field: "upload_prefix",
                value: prefix.to_string(),
            });
        }
        let trimmed = prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidPath {
                field: "upload_prefix",
                value: prefix.to_string(),
            });
        }
        Ok(Self {
            prefix: trimmed.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Segment-aware prefix match: `/api/edgestore` and `/api/edgestore/...`
    /// match, `/api/edgestorefoo` does not.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// CORS headers for an upload-proxy response.
pub fn upload_cors_headers(origin: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        origin
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(UPLOAD_ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(UPLOAD_ALLOW_HEADERS),
    );
    headers
}

#[derive(Debug, Clone, Default)]
pub struct EdgeInterceptor {
    config: EdgeInterceptorConfig,
}

impl EdgeInterceptor {
    pub fn new(config: EdgeInterceptorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EdgeInterceptorConfig {
        &self.config
    }

    /// Attach the upload CORS headers to `response` when `path` is in the upload
    /// namespace. Status and body are never touched.
    pub fn apply(&self, path: &str, origin: Option<&HeaderValue>, response: &mut Response) {
        if !self.config.matches(path) {
            return;
        }
        response.headers_mut().extend(upload_cors_headers(origin));
    }
}

pub async fn edge_interceptor_middleware(
    State(interceptor): State<EdgeInterceptor>,
    request: Request,
    next: Next,
) -> Response {
    if !interceptor.config().matches(request.uri().path()) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let origin = request.headers().get(ORIGIN).cloned();
    let mut response = next.run(request).await;
    interceptor.apply(&path, origin.as_ref(), &mut response);
    response
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, StatusCode},
        middleware,
        routing::{any, get},
        Router,
    };
    use tower::ServiceExt;

    use super::*;

    const CORS_HEADERS: [http::HeaderName; 4] = [
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_HEADERS,
    ];

    fn app() -> Router {
        Router::new()
            .route("/api/edgestore", any(|| async { "root" }))
            .route("/api/edgestore/{*rest}", any(|| async { "upload" }))
            .route("/api/edgestorefoo", get(|| async { "lookalike" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route(
                "/x/api/edgestore/files",
                get(|| async { (StatusCode::ACCEPTED, "nested") }),
            )
            .layer(middleware::from_fn_with_state(
                EdgeInterceptor::default(),
                edge_interceptor_middleware,
            ))
    }

    async fn call(uri: &str, origin: Option<&str>) -> Response {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(origin) = origin {
            builder = builder.header(ORIGIN, origin);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_prefix_matching() {
        let config = EdgeInterceptorConfig::default();
        assert!(config.matches("/api/edgestore"));
        assert!(config.matches("/api/edgestore/"));
        assert!(config.matches("/api/edgestore/init"));
        assert!(config.matches("/api/edgestore/upload/part/3"));
        assert!(!config.matches("/api/edgestorefoo"));
        assert!(!config.matches("/api/edge"));
        assert!(!config.matches("/x/api/edgestore"));
        assert!(!config.matches("/"));
    }

    #[test]
    fn test_config_normalizes_trailing_slash() {
        let config = EdgeInterceptorConfig::new("/uploads/").unwrap();
        assert_eq!(config.prefix(), "/uploads");
        assert!(config.matches("/uploads/a"));
    }

    #[test]
    fn test_config_rejects_relative_and_root_prefix() {
        assert!(EdgeInterceptorConfig::new("api/edgestore").is_err());
        assert!(EdgeInterceptorConfig::new("/").is_err());
        assert!(EdgeInterceptorConfig::new("").is_err());
    }

    #[test]
    fn test_config_rejects_route_patterns() {
        for prefix in ["/api/{*rest}", "/api/{bucket}", "/api/*", "/api/:bucket"] {
            assert!(
                matches!(
                    EdgeInterceptorConfig::new(prefix),
                    Err(ConfigError::RoutePattern { .. })
                ),
                "{prefix}"
            );
        }
    }

    #[test]
    fn test_header_values() {
        let headers = upload_cors_headers(None);
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS],
            "GET,OPTIONS,PATCH,DELETE,POST,PUT"
        );
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, \
             Content-MD5, Content-Type, Date, X-Api-Version, edgestore-ctx"
        );
    }

    #[tokio::test]
    async fn test_non_matching_paths_untouched() {
        for uri in ["/dashboard", "/api/edgestorefoo", "/x/api/edgestore/files"] {
            let response = call(uri, Some("https://example.com")).await;
            for name in &CORS_HEADERS {
                assert!(
                    response.headers().get(name).is_none(),
                    "{name} set on {uri}"
                );
            }
        }

        let nested = call("/x/api/edgestore/files", None).await;
        assert_eq!(nested.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_matching_paths_get_all_headers() {
        for uri in ["/api/edgestore", "/api/edgestore/init", "/api/edgestore/a/b/c"] {
            let response = call(uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            let expected = upload_cors_headers(None);
            for name in &CORS_HEADERS {
                assert_eq!(response.headers().get(name), expected.get(name), "{uri}");
            }
        }
    }

    #[tokio::test]
    async fn test_origin_is_echoed() {
        let response = call("/api/edgestore/init", Some("https://example.com")).await;
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn test_missing_origin_falls_back_to_wildcard() {
        let response = call("/api/edgestore/init", None).await;
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_body_and_status_preserved() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/edgestore/init")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"upload");
    }

    #[test]
    fn test_apply_overwrites_existing_values() {
        let interceptor = EdgeInterceptor::default();
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://stale"));

        let origin = HeaderValue::from_static("https://example.com");
        interceptor.apply("/api/edgestore/x", Some(&origin), &mut response);

        let values: Vec<_> = response
            .headers()
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .collect();
        assert_eq!(values, vec!["https://example.com"]);
    }
}
