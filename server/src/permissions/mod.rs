//! Permission system types and utilities.
//!
//! Channel visibility model:
//! - Base permissions: union of the masks of a member's roles
//! - Channel overwrites: @everyone, then each held role, then the member

pub mod access;
pub mod cache;
pub mod guild;
pub mod models;
pub mod resolver;

pub use access::{AccessControl, AccessError};
pub use cache::{PermissionCaches, TtlCache, DEFAULT_ACCESS_TTL, DEFAULT_ROLE_TTL};
pub use guild::Permissions;
pub use models::*;
pub use resolver::{
    apply_overwrite, can_view_channel, compute_base_permissions, resolve_channel_permissions,
};
