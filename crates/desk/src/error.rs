//! Unified error handling with Sentry integration.
//!
//! Most desk failures are shown to the operator inside the page (inline
//! errors, notices). `AppError` covers the rest: requests that cannot be
//! served at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::workflows::BeginError;

/// Application-level error type for the desk.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    /// Completion could not start.
    #[error(transparent)]
    Completion(#[from] BeginError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Gateway(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::Completion(BeginError::NotMounted(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Completion(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
