//! API error types with HTTP response mapping.
//!
//! Handlers and extractors return [`ApiError`]. Its response carries only the
//! status and an [`ErrorMessage`] extension; [`error_envelope`] turns that
//! into the uniform JSON body once the request method and path are known.

use axum::Json;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use serde::Serialize;
use thiserror::Error;

use crate::validation::{FieldViolation, format_violations};

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The decoded body violated one or more field constraints.
    #[error("{}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// The request could not be decoded.
    #[error("{0}")]
    InvalidArgument(String),

    /// No route matched.
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// Returns the classification used for the status lookup.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Domain(err) => err.kind(),
            ApiError::Validation(_) => ErrorKind::ValidationFailed,
            ApiError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ApiError::NotFound(_) => ErrorKind::EntityNotFound,
        }
    }

    /// Message shown to clients. Store and internal failures are masked.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::ConflictingState => "Data integrity violation. Request rejected".to_string(),
            ErrorKind::Unexpected => "Unexpected error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// The one place an error kind becomes an HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::EntityNotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateMember => StatusCode::BAD_REQUEST,
        ErrorKind::MemberNotFound => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidState => StatusCode::BAD_REQUEST,
        ErrorKind::ConflictingState => StatusCode::CONFLICT,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::Unexpected => tracing::error!(error = %self, "unexpected error"),
            ErrorKind::ConflictingState => tracing::warn!(error = %self, "constraint violation"),
            _ => tracing::debug!(error = %self, ?kind, "request rejected"),
        }

        let mut response = status_for(kind).into_response();
        response
            .extensions_mut()
            .insert(ErrorMessage(self.public_message()));
        response
    }
}

/// Client-facing message attached to error responses.
#[derive(Debug, Clone)]
pub struct ErrorMessage(pub String);

/// Uniform error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub http_status_code: u16,
    pub method: String,
    pub request_uri: String,
    pub message: String,
}

/// Middleware rendering every error response as an [`ErrorResponse`].
///
/// [`ApiError`] responses carry their message; error statuses produced by the
/// router itself (such as 405) get one derived from the status.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let request_uri = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();
    let message = match response.extensions_mut().remove::<ErrorMessage>() {
        Some(ErrorMessage(message)) => message,
        None if status == StatusCode::METHOD_NOT_ALLOWED => {
            format!("Request method '{method}' is not supported")
        }
        None if status.is_client_error() || status.is_server_error() => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        None => return response,
    };

    let body = ErrorResponse {
        http_status_code: status.as_u16(),
        method,
        request_uri,
        message,
    };

    // Keep headers such as `Allow`; the body and its framing are replaced.
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}

/// Fallback for unmatched routes.
pub async fn route_not_found(request: Request) -> ApiError {
    ApiError::NotFound(format!("No route for {} {}", request.method(), request.uri().path()))
}
