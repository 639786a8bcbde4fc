//! Rate limiting error types for HTTP responses.

use crate::ratelimit::RateLimitResult;
use axum::http::header::{HeaderValue, RETRY_AFTER};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Rejection produced when a rate limit check denies a request.
#[derive(Debug)]
pub enum RateLimitError {
    /// Request exceeded the rate limit.
    LimitExceeded(RateLimitResult),
}

/// JSON response body for rate limit errors.
#[derive(Serialize)]
pub struct RateLimitErrorResponse {
    /// Error code identifier.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Seconds to wait before retrying.
    pub retry_after: u64,
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests (always 0 when rate limited).
    pub remaining: u32,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        match self {
            Self::LimitExceeded(result) => {
                let body = RateLimitErrorResponse {
                    error: "rate_limited",
                    message: format!("Too many refreshes. Wait {}.", result.wait_display()),
                    retry_after: result.retry_after,
                    limit: result.limit,
                    remaining: 0,
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                if let Ok(v) = HeaderValue::from_str(&result.retry_after.to_string()) {
                    response.headers_mut().insert(RETRY_AFTER, v);
                }
                response
            }
        }
    }
}
