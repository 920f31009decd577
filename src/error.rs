use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    #[serde(rename = "type")]
    error_type: &'static str,
    code: &'a str,
    message: &'a str,
}

pub const HEADER_X_CONSOLE_ERROR_CODE: &str = "X-Console-Error-Code";

fn not_found(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::NOT_FOUND, code, message)
}

fn service_unavailable(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::SERVICE_UNAVAILABLE, code, message)
}

fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::BAD_REQUEST, code, message)
}

fn bad_gateway(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::BAD_GATEWAY, code, message)
}

fn gateway_timeout(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::GATEWAY_TIMEOUT, code, message)
}

fn payload_too_large(code: impl Into<String>, message: impl Into<String>) -> Response {
    create_error(StatusCode::PAYLOAD_TOO_LARGE, code, message)
}

pub fn create_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> Response {
    let code_str = code.into();
    let message_str = message.into();

    let mut headers = HeaderMap::with_capacity(1);
    if let Ok(val) = HeaderValue::from_str(&code_str) {
        headers.insert(HEADER_X_CONSOLE_ERROR_CODE, val);
    }

    (
        status,
        headers,
        Json(ErrorResponse {
            error: ErrorDetail {
                error_type: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status Code"),
                code: &code_str,
                message: &message_str,
            },
        }),
    )
        .into_response()
}

pub fn extract_error_code_from_response<B>(response: &Response<B>) -> &str {
    response
        .headers()
        .get(HEADER_X_CONSOLE_ERROR_CODE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Failures while forwarding to the upload backend.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upload backend is not configured")]
    NotConfigured,

    #[error("invalid upload target: {0}")]
    InvalidTarget(String),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("upload backend sent an unusable response: {0}")]
    InvalidResponse(String),

    #[error("upload backend timed out")]
    Timeout,

    #[error("upload backend request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(e)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::NotConfigured => service_unavailable("upload_backend_not_configured", message),
            Self::InvalidTarget(_) => not_found("upload_route_not_found", message),
            Self::BodyTooLarge { .. } => payload_too_large("upload_body_too_large", message),
            Self::BodyRead(_) => bad_request("upload_body_unreadable", message),
            Self::InvalidResponse(_) => bad_gateway("upload_backend_invalid_response", message),
            Self::Timeout => gateway_timeout("upload_backend_timeout", message),
            Self::Upstream(_) => bad_gateway("upload_backend_unreachable", message),
        }
    }
}
