//! Permission resolution logic.
//!
//! Reproduces the upstream channel-visibility rules from role masks and
//! channel overwrites. Everything here is pure.

use super::guild::Permissions;
use super::models::{Channel, Overwrite, OverwriteSubject, RolePermissionTable, Snowflake};

/// Union of the masks of every role the user holds.
///
/// Roles missing from the table contribute nothing.
pub fn compute_base_permissions(
    user_role_ids: &[Snowflake],
    role_permissions: &RolePermissionTable,
) -> Permissions {
    user_role_ids
        .iter()
        .filter_map(|role_id| role_permissions.get(role_id))
        .fold(Permissions::empty(), |acc, perms| acc | *perms)
}

/// Apply one overwrite to a mask: deny bits are cleared, then allow bits set.
#[must_use]
pub fn apply_overwrite(mask: Permissions, allow: Permissions, deny: Permissions) -> Permissions {
    (mask & !deny) | allow
}

fn first_matching(overwrites: &[Overwrite], subject: OverwriteSubject) -> Option<&Overwrite> {
    overwrites.iter().find(|o| o.subject == subject)
}

/// Compute the final channel mask for a user.
///
/// Resolution order:
/// 1. @everyone overwrite (role overwrite whose id is the guild id)
/// 2. One overwrite per held role, in the order the roles are given
/// 3. Member overwrite for the user
///
/// Each step applies at most the first matching overwrite. Later steps
/// override earlier ones on the bits they touch.
pub fn resolve_channel_permissions(
    channel: &Channel,
    user_role_ids: &[Snowflake],
    base: Permissions,
    guild_id: Snowflake,
    user_id: Snowflake,
) -> Permissions {
    let overwrites = channel.overwrites.as_slice();
    let mut perms = base;

    if let Some(ovr) = first_matching(overwrites, OverwriteSubject::Role(guild_id)) {
        perms = apply_overwrite(perms, ovr.allow, ovr.deny);
    }

    for role_id in user_role_ids {
        if let Some(ovr) = first_matching(overwrites, OverwriteSubject::Role(*role_id)) {
            perms = apply_overwrite(perms, ovr.allow, ovr.deny);
        }
    }

    if let Some(ovr) = first_matching(overwrites, OverwriteSubject::Member(user_id)) {
        perms = apply_overwrite(perms, ovr.allow, ovr.deny);
    }

    perms
}

/// Whether the user ends up with `VIEW_CHANNEL` on the channel.
pub fn can_view_channel(
    channel: &Channel,
    user_role_ids: &[Snowflake],
    base: Permissions,
    guild_id: Snowflake,
    user_id: Snowflake,
) -> bool {
    resolve_channel_permissions(channel, user_role_ids, base, guild_id, user_id)
        .has(Permissions::VIEW_CHANNEL)
}
