//! Archive access handlers.
//!
//! Visibility checks always run with the caller's own upstream credentials.
//! Any failure resolving access is reported as an error, never as "allowed".

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::auth::AuthUser;
use crate::permissions::Snowflake;
use crate::ratelimit::RateLimitError;

#[derive(Debug, Serialize)]
pub struct AccessibleChannelsResponse {
    pub guild_id: Snowflake,
    pub channels: Vec<Snowflake>,
}

#[derive(Debug, Serialize)]
pub struct ChannelAccessResponse {
    pub channel_id: Snowflake,
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub accepted: bool,
    pub remaining: u32,
}

/// `GET /api/guilds/{guild_id}/channels/accessible`
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_accessible_channels(
    State(state): State<AppState>,
    user: AuthUser,
    Path(guild_id): Path<u64>,
) -> Result<Json<AccessibleChannelsResponse>, ApiError> {
    let guild_id = Snowflake(guild_id);
    let accessible = state
        .access
        .list_accessible_channels(&user.directory, user.id, guild_id)
        .await?;

    let mut channels: Vec<Snowflake> = accessible.iter().copied().collect();
    channels.sort_unstable();

    Ok(Json(AccessibleChannelsResponse { guild_id, channels }))
}

/// `GET /api/guilds/{guild_id}/channels/{channel_id}/access`
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn channel_access(
    State(state): State<AppState>,
    user: AuthUser,
    Path((guild_id, channel_id)): Path<(u64, u64)>,
) -> Result<Json<ChannelAccessResponse>, ApiError> {
    let channel_id = Snowflake(channel_id);
    let allowed = state
        .access
        .can_user_view_channel(&user.directory, user.id, Snowflake(guild_id), channel_id)
        .await?;

    Ok(Json(ChannelAccessResponse {
        channel_id,
        allowed,
    }))
}

/// `POST /api/guilds/{guild_id}/channels/{channel_id}/refresh`
///
/// Admits a history refresh for a channel the caller can view, subject to
/// the shared refresh rate limit.
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn request_refresh(
    State(state): State<AppState>,
    user: AuthUser,
    Path((guild_id, channel_id)): Path<(u64, u64)>,
) -> Result<(StatusCode, Json<RefreshResponse>), ApiError> {
    let allowed = state
        .access
        .can_user_view_channel(
            &user.directory,
            user.id,
            Snowflake(guild_id),
            Snowflake(channel_id),
        )
        .await?;
    if !allowed {
        tracing::info!(username = %user.username, "Refresh refused, no channel access");
        return Err(ApiError::Forbidden);
    }

    let result = state.rate_limiter.check_and_record().await;
    if !result.allowed {
        return Err(ApiError::RateLimited(RateLimitError::LimitExceeded(result)));
    }

    tracing::info!(username = %user.username, remaining = result.remaining, "Refresh admitted");
    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            accepted: true,
            remaining: result.remaining,
        }),
    ))
}
