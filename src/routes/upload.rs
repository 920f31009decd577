//! Forwarding for the upload-proxy namespace.
//!
//! Requests under the upload prefix are relayed to the upload backend with the
//! prefix stripped and the backend's base path prepended. The backend's status,
//! headers and body are streamed back as-is.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use tracing::{debug, warn};
use url::Url;

use crate::error::ProxyError;

/// Upload control requests are small JSON calls; file bytes go straight to storage.
pub const MAX_UPLOAD_BODY_BYTES: usize = 10 * 1024 * 1024;

const HOP_BY_HOP_HEADERS: [HeaderName; 9] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
    header::CONTENT_LENGTH,
];

#[derive(Debug, Clone)]
pub struct UploadProxy {
    client: reqwest::Client,
    backend: Option<Url>,
    prefix: String,
}

impl UploadProxy {
    pub fn new(
        backend: Option<Url>,
        prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProxyError::Upstream)?;
        Ok(Self {
            client,
            backend,
            prefix: prefix.into(),
        })
    }

    /// Backend URL for a request path and query under the upload prefix.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
        let backend = self.backend.as_ref().ok_or(ProxyError::NotConfigured)?;
        let suffix = path
            .strip_prefix(self.prefix.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| ProxyError::InvalidTarget(path.to_string()))?;

        let mut target = format!("{}{}", backend.as_str().trim_end_matches('/'), suffix);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        Url::parse(&target).map_err(|e| ProxyError::InvalidTarget(e.to_string()))
    }

    async fn forward(&self, request: Request) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let target = self.target_url(parts.uri.path(), parts.uri.query())?;
        let body = axum::body::to_bytes(body, MAX_UPLOAD_BODY_BYTES)
            .await
            .map_err(body_read_error)?;

        debug!(method = %parts.method, target = %target, "Forwarding upload request");
        let upstream = self
            .client
            .request(parts.method, target)
            .headers(strip_hop_by_hop(parts.headers))
            .body(body)
            .send()
            .await?;

        let mut response = http::Response::builder().status(upstream.status());
        if let Some(headers) = response.headers_mut() {
            headers.extend(strip_hop_by_hop(upstream.headers().clone()));
        }
        response
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| ProxyError::InvalidResponse(e.to_string()))
    }
}

fn body_read_error(e: axum::Error) -> ProxyError {
    let inner = e.into_inner();
    if inner.is::<LengthLimitError>() {
        ProxyError::BodyTooLarge {
            limit: MAX_UPLOAD_BODY_BYTES,
        }
    } else {
        ProxyError::BodyRead(inner.to_string())
    }
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in &HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers
}

pub async fn proxy_upload(State(proxy): State<UploadProxy>, request: Request) -> Response {
    match proxy.forward(request).await {
        Ok(response) => response,
        Err(e) => {
            if !matches!(e, ProxyError::NotConfigured) {
                warn!(error = %e, "Upload proxy request failed");
            }
            e.into_response()
        }
    }
}
