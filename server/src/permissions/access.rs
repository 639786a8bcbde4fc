//! Channel access resolution for archive viewers.
//!
//! Combines the directory, the permission caches and the resolver into the
//! two caller-facing checks. All failures fail closed: an error is returned
//! and nothing is cached, callers must treat it as "no access".

use std::collections::HashSet;
use std::sync::Arc;

use futures::TryFutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::PermissionCaches;
use super::models::{RolePermissionTable, Snowflake};
use super::resolver::{can_view_channel, compute_base_permissions};
use crate::directory::{DirectoryClient, DirectoryError};

/// Access resolution errors.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Upstream could not be reached or refused the request.
    #[error("upstream directory unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered with data we could not interpret.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl From<DirectoryError> for AccessError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Malformed { .. } => Self::MalformedResponse(err.to_string()),
            DirectoryError::Unavailable(_) | DirectoryError::Status { .. } => {
                Self::UpstreamUnavailable(err.to_string())
            }
        }
    }
}

/// Cache-fronted channel visibility checks.
///
/// The directory is passed per call so one instance can serve requests made
/// with different upstream credentials while sharing its caches.
#[derive(Clone, Default)]
pub struct AccessControl {
    caches: Arc<PermissionCaches>,
}

impl AccessControl {
    pub fn new(caches: PermissionCaches) -> Self {
        Self {
            caches: Arc::new(caches),
        }
    }

    pub fn caches(&self) -> &PermissionCaches {
        &self.caches
    }

    /// Role permission table for a guild, served from cache when fresh.
    pub async fn guild_role_permissions<D: DirectoryClient>(
        &self,
        directory: &D,
        guild_id: Snowflake,
    ) -> Result<Arc<RolePermissionTable>, AccessError> {
        if let Some(table) = self.caches.role_permissions(guild_id).await {
            return Ok(table);
        }

        let table = Arc::new(directory.get_guild_role_permissions(guild_id).await?);
        self.caches
            .store_role_permissions(guild_id, Arc::clone(&table))
            .await;
        Ok(table)
    }

    /// Set of channel ids in `guild_id` the user can view.
    #[tracing::instrument(skip(self, directory))]
    pub async fn list_accessible_channels<D: DirectoryClient>(
        &self,
        directory: &D,
        user_id: Snowflake,
        guild_id: Snowflake,
    ) -> Result<Arc<HashSet<Snowflake>>, AccessError> {
        if let Some(channels) = self.caches.accessible_channels(user_id, guild_id).await {
            return Ok(channels);
        }

        let (channels, user_roles, role_permissions) = futures::try_join!(
            directory
                .get_guild_channels(guild_id)
                .map_err(AccessError::from),
            directory
                .get_user_roles(guild_id, user_id)
                .map_err(AccessError::from),
            self.guild_role_permissions(directory, guild_id),
        )
        .inspect_err(|e| warn!(error = %e, "Channel access resolution failed"))?;

        let base = compute_base_permissions(&user_roles, &role_permissions);

        let accessible: HashSet<Snowflake> = channels
            .iter()
            .filter(|channel| channel.guild_id == Some(guild_id))
            .filter(|channel| can_view_channel(channel, &user_roles, base, guild_id, user_id))
            .inspect(|channel| {
                debug!(channel_id = %channel.id, name = ?channel.name, "Channel visible");
            })
            .map(|channel| channel.id)
            .collect();

        info!(
            visible = accessible.len(),
            total = channels.len(),
            "Resolved channel access"
        );

        let accessible = Arc::new(accessible);
        self.caches
            .store_accessible_channels(user_id, guild_id, Arc::clone(&accessible))
            .await;
        Ok(accessible)
    }

    /// Whether the user can view a single channel.
    pub async fn can_user_view_channel<D: DirectoryClient>(
        &self,
        directory: &D,
        user_id: Snowflake,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> Result<bool, AccessError> {
        let accessible = self
            .list_accessible_channels(directory, user_id, guild_id)
            .await?;
        Ok(accessible.contains(&channel_id))
    }
}
