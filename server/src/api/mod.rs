//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod archive;
pub mod error;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    auth,
    config::Config,
    directory::HttpDirectoryClient,
    permissions::{AccessControl, PermissionCaches, TtlCache, UserProfile},
    ratelimit::RateLimiter,
};

pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Verified upstream tokens and their owners
    pub sessions: Arc<TtlCache<String, UserProfile>>,
    /// Unauthenticated upstream client; bound to a token per request
    pub directory: HttpDirectoryClient,
    /// Cache-fronted channel visibility checks
    pub access: AccessControl,
    /// Refresh rate limiter
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: Config,
        directory: HttpDirectoryClient,
        rate_limiter: RateLimiter,
    ) -> Self {
        let caches = PermissionCaches::new(config.access_cache_ttl, config.role_cache_ttl);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(TtlCache::new()),
            directory,
            access: AccessControl::new(caches),
            rate_limiter,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/guilds/{guild_id}/channels/accessible",
            get(archive::list_accessible_channels),
        )
        .route(
            "/api/guilds/{guild_id}/channels/{channel_id}/access",
            get(archive::channel_access),
        )
        .route(
            "/api/guilds/{guild_id}/channels/{channel_id}/refresh",
            post(archive::request_refresh),
        )
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether rate limiting is enabled
    rate_limiting: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rate_limiting: state.rate_limiter.config().enabled,
    })
}
