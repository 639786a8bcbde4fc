//! Upstream data models for the permission system.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::guild::{LenientU64Visitor, Permissions};

/// Upstream object identifier (guilds, channels, roles and users share the space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(pub u64);

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientU64Visitor).map(Self)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Who a channel overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverwriteSubject {
    /// A guild role. The role whose id equals the guild id is @everyone.
    Role(Snowflake),
    /// A single guild member.
    Member(Snowflake),
}

/// Channel permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOverwrite")]
pub struct Overwrite {
    pub subject: OverwriteSubject,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl Overwrite {
    /// Overwrite targeting a role.
    #[must_use]
    pub const fn role(role_id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            subject: OverwriteSubject::Role(role_id),
            allow,
            deny,
        }
    }

    /// Overwrite targeting a single member.
    #[must_use]
    pub const fn member(user_id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            subject: OverwriteSubject::Member(user_id),
            allow,
            deny,
        }
    }
}

/// Wire shape of an overwrite: `type` 0 is a role, 1 is a member.
#[derive(Debug, Deserialize)]
struct RawOverwrite {
    id: Snowflake,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    allow: Permissions,
    #[serde(default)]
    deny: Permissions,
}

impl TryFrom<RawOverwrite> for Overwrite {
    type Error = String;

    fn try_from(raw: RawOverwrite) -> Result<Self, Self::Error> {
        let subject = match raw.kind {
            0 => OverwriteSubject::Role(raw.id),
            1 => OverwriteSubject::Member(raw.id),
            other => return Err(format!("unknown overwrite type {other}")),
        };
        Ok(Self {
            subject,
            allow: raw.allow,
            deny: raw.deny,
        })
    }
}

/// Guild channel with its overwrites in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "permission_overwrites")]
    pub overwrites: Vec<Overwrite>,
}

/// Role id to permission mask for a single guild.
pub type RolePermissionTable = HashMap<Snowflake, Permissions>;

/// Guild role as returned by the roles listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRole {
    pub id: Snowflake,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Guild member record; only the role list is used.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

/// The user that owns an upstream token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}
