//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::directory::{DirectoryClient, HttpDirectoryClient};
use crate::permissions::Snowflake;

use super::error::AuthError;

/// Authenticated user injected into request extensions.
///
/// Carries a directory client bound to the caller's upstream token so
/// handlers query upstream with the caller's own credentials.
#[derive(Clone)]
pub struct AuthUser {
    /// Upstream user ID.
    pub id: Snowflake,
    /// Upstream username.
    pub username: String,
    /// Directory client authenticated as this user.
    pub directory: HttpDirectoryClient,
}

/// Middleware to require authentication.
///
/// Takes the upstream token from the Authorization header verbatim, resolves
/// its owner with the directory, and injects `AuthUser` into request
/// extensions. Verified tokens are remembered for `session_cache_ttl`;
/// rejected ones are not.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .ok_or(AuthError::MissingAuthHeader)?;

    let directory = state.directory.with_token(&token);
    let profile = match state.sessions.get(&token).await {
        Some(profile) => profile,
        None => {
            let profile = directory.get_current_user().await?;
            tracing::debug!(user_id = %profile.id, username = %profile.username, "Authenticated");
            state
                .sessions
                .put(token, profile.clone(), state.config.session_cache_ttl)
                .await;
            profile
        }
    };

    request.extensions_mut().insert(AuthUser {
        id: profile.id,
        username: profile.username,
        directory,
    });

    Ok(next.run(request).await)
}

/// Extractor for authenticated user in handlers.
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
