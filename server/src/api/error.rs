//! API error type shared by archive handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::permissions::AccessError;
use crate::ratelimit::RateLimitError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("You do not have access to this channel")]
    Forbidden,

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Refresh rate limited")]
    RateLimited(RateLimitError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Self::RateLimited(inner) => return inner.into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Access(ref e) => {
                tracing::warn!(error = %e, "Access check failed, denying");
                match e {
                    AccessError::UpstreamUnavailable(_) => {
                        (StatusCode::BAD_GATEWAY, "upstream_unavailable")
                    }
                    AccessError::MalformedResponse(_) => {
                        (StatusCode::BAD_GATEWAY, "malformed_upstream")
                    }
                }
            }
        };

        (
            status,
            Json(json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}
