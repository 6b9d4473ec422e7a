//! Unified error handling for route handlers.
//!
//! All handlers return `Result<T, AppError>`; server-side failures are
//! logged before responding and never echo internals to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigcommerce_client::{BigCommerceError, SignedPayloadError};
use thiserror::Error;

/// Application-level error type for the app server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A signed payload failed verification.
    #[error("Signed payload rejected: {0}")]
    SignedPayload(#[from] SignedPayloadError),

    /// BigCommerce rejected or failed a request made on the caller's behalf.
    #[error("BigCommerce error: {0}")]
    Upstream(#[from] BigCommerceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SignedPayload(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Upstream(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "Request error");
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::SignedPayload(_) | Self::Unauthorized(_) => "Not Authenticated".to_string(),
            Self::Upstream(_) => "External service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing code".to_string());
        assert_eq!(err.to_string(), "Bad request: missing code");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(SignedPayloadError::SignatureMismatch.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(BigCommerceError::OAuth("invalid_grant".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::NotFound("store".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
