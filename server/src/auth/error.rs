//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::directory::DirectoryError;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing Authorization header.
    #[error("Missing authorization header")]
    MissingAuthHeader,

    /// Upstream rejected the token.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token could not be checked.
    #[error("Upstream unavailable: {0}")]
    Upstream(DirectoryError),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Status {
                status: 401 | 403, ..
            } => Self::InvalidToken,
            other => Self::Upstream(other),
        }
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "missing_auth"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            Self::Upstream(e) => {
                tracing::warn!(error = %e, "Token verification failed upstream");
                (StatusCode::BAD_GATEWAY, "upstream_unavailable")
            }
        };

        let body = ErrorBody {
            error: code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
