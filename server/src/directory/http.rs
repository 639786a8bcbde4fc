//! HTTP directory client for the upstream chat platform API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{DirectoryClient, DirectoryError};
use crate::permissions::{
    Channel, GuildMember, GuildRole, RolePermissionTable, Snowflake, UserProfile,
};

/// Directory client backed by the upstream REST API.
///
/// Cheap to clone. The underlying connection pool is shared between clones,
/// so a per-request client is built with [`HttpDirectoryClient::with_token`].
#[derive(Clone)]
pub struct HttpDirectoryClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl HttpDirectoryClient {
    /// Create a client without credentials.
    ///
    /// `base_url` is the API root, e.g. `https://discord.com/api/v9`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    /// Same connection pool, different credentials.
    #[must_use]
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            http: self.http.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Some(Arc::from(token)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DirectoryError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token.as_ref());
        }

        let response = request.send().await.map_err(|e| {
            warn!(endpoint = %path, error = %e, "Upstream request failed");
            DirectoryError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %path, status = status.as_u16(), "Upstream returned error status");
            return Err(DirectoryError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(endpoint = %path, error = %e, "Upstream response did not parse");
            DirectoryError::Malformed {
                endpoint: path.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl DirectoryClient for HttpDirectoryClient {
    #[tracing::instrument(skip(self))]
    async fn get_user_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Vec<Snowflake>, DirectoryError> {
        let member: GuildMember = self
            .get_json(&format!("/guilds/{guild_id}/members/{user_id}"))
            .await?;
        debug!(roles = member.roles.len(), "Fetched member roles");
        Ok(member.roles)
    }

    #[tracing::instrument(skip(self))]
    async fn get_guild_role_permissions(
        &self,
        guild_id: Snowflake,
    ) -> Result<RolePermissionTable, DirectoryError> {
        let roles: Vec<GuildRole> = self.get_json(&format!("/guilds/{guild_id}/roles")).await?;
        Ok(roles
            .into_iter()
            .map(|role| (role.id, role.permissions))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_guild_channels(&self, guild_id: Snowflake) -> Result<Vec<Channel>, DirectoryError> {
        self.get_json(&format!("/guilds/{guild_id}/channels")).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_current_user(&self) -> Result<UserProfile, DirectoryError> {
        self.get_json("/users/@me").await
    }
}
