//! Request-scoped error type and its HTTP mapping.
//!
//! # Design Decisions
//! - One tagged variant per failure class; handlers never abort the process
//! - Diagnostics are plain text and never carry filesystem paths
//! - "No match" is not an error: queries return empty collections instead

use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::registry::ResourceKind;

/// Where a decode failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOrigin {
    /// A cached snapshot document failed to decode.
    Snapshot(ResourceKind),
    /// The caller's request body failed to decode.
    RequestBody,
}

impl std::fmt::Display for DecodeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeOrigin::Snapshot(kind) => write!(f, "snapshot `{}`", kind),
            DecodeOrigin::RequestBody => write!(f, "request body"),
        }
    }
}

/// Errors surfaced by the registry, merge and render layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backing snapshot file is missing or unreadable.
    #[error("snapshot for `{resource}` is unavailable")]
    CacheUnavailable { resource: ResourceKind },

    /// Malformed JSON in a snapshot or in a request body.
    #[error("malformed {origin}: {detail}")]
    DecodeFailure { origin: DecodeOrigin, detail: String },

    /// Nothing is routed at the requested path.
    #[error("no resource at {0}")]
    NotFound(String),

    /// Unparseable path, unknown selector or empty submission.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method {0} not allowed, submit configurations with POST")]
    MethodNotAllowed(Method),

    #[error("unsupported content type `{0}`, submit application/json")]
    UnsupportedMediaType(String),

    /// Peer resolution did not finish within the request deadline.
    #[error("peer resolution exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// The registry mirror could not be reached or answered garbage.
    #[error("registry lookup failed: {0}")]
    Registry(String),

    /// A template set failed to compile or render.
    #[error("rendering failed: {0}")]
    Render(String),
}

/// Result type for request-scoped operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn decode(origin: DecodeOrigin, err: impl std::fmt::Display) -> Self {
        ApiError::DecodeFailure {
            origin,
            detail: err.to_string(),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CacheUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DecodeFailure {
                origin: DecodeOrigin::Snapshot(_),
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DecodeFailure {
                origin: DecodeOrigin::RequestBody,
                ..
            } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Registry(_) => StatusCode::BAD_GATEWAY,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response();

        if let ApiError::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
        }
        response
    }
}
