//! Upstream directory access.
//!
//! The directory answers who holds which roles, what each role grants and
//! which channels a guild has. The permission resolver only consumes its
//! outputs.

pub mod http;

use std::future::Future;

use thiserror::Error;

use crate::permissions::{Channel, RolePermissionTable, Snowflake, UserProfile};

pub use http::HttpDirectoryClient;

/// Failures talking to the upstream directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport failure (connect, timeout, reset).
    #[error("upstream request failed: {0}")]
    Unavailable(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Body did not match the expected shape.
    #[error("malformed upstream response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Source of guild membership, role and channel data.
pub trait DirectoryClient: Send + Sync {
    /// Role ids held by a member, in the order upstream returns them.
    fn get_user_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> impl Future<Output = Result<Vec<Snowflake>, DirectoryError>> + Send;

    /// Permission mask of every role in a guild.
    fn get_guild_role_permissions(
        &self,
        guild_id: Snowflake,
    ) -> impl Future<Output = Result<RolePermissionTable, DirectoryError>> + Send;

    /// All channels of a guild with their overwrites.
    fn get_guild_channels(
        &self,
        guild_id: Snowflake,
    ) -> impl Future<Output = Result<Vec<Channel>, DirectoryError>> + Send;

    /// The user that owns the credentials this client was built with.
    fn get_current_user(&self) -> impl Future<Output = Result<UserProfile, DirectoryError>> + Send;
}
