//! Permission caches.
//!
//! Two independently lifetimed caches sit between the access resolution and
//! the upstream directory:
//! - `(user, guild)` to the set of channels the user can view
//! - `guild` to its role permission table
//!
//! Expiry is lazy. Entries are checked on read and stay in memory until the
//! next refill overwrites them. Locks are only held for the in-memory lookup
//! or update, never across an upstream call, so concurrent misses for the
//! same key each fetch and the last writer wins.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::models::{RolePermissionTable, Snowflake};

/// Default lifetime of a user's accessible-channel set (2 hours).
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Default lifetime of a guild role permission table (24 hours).
pub const DEFAULT_ROLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CacheEntry<V> {
    value: V,
    /// `None` when `now + ttl` is past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Read-mostly map with per-entry expiry.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if present and not yet expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Store a value, replacing whatever was there.
    ///
    /// A TTL too large to add to the clock keeps the entry forever.
    pub async fn put(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The two permission caches with their configured lifetimes.
pub struct PermissionCaches {
    access: TtlCache<(Snowflake, Snowflake), Arc<HashSet<Snowflake>>>,
    roles: TtlCache<Snowflake, Arc<RolePermissionTable>>,
    access_ttl: Duration,
    role_ttl: Duration,
}

impl Default for PermissionCaches {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_TTL, DEFAULT_ROLE_TTL)
    }
}

impl PermissionCaches {
    pub fn new(access_ttl: Duration, role_ttl: Duration) -> Self {
        Self {
            access: TtlCache::new(),
            roles: TtlCache::new(),
            access_ttl,
            role_ttl,
        }
    }

    /// Accessible channels for a user in a guild, if cached.
    pub async fn accessible_channels(
        &self,
        user_id: Snowflake,
        guild_id: Snowflake,
    ) -> Option<Arc<HashSet<Snowflake>>> {
        let hit = self.access.get(&(user_id, guild_id)).await;
        if hit.is_some() {
            tracing::debug!(%user_id, %guild_id, "Using cached channel access");
        }
        hit
    }

    pub async fn store_accessible_channels(
        &self,
        user_id: Snowflake,
        guild_id: Snowflake,
        channels: Arc<HashSet<Snowflake>>,
    ) {
        self.access
            .put((user_id, guild_id), channels, self.access_ttl)
            .await;
        tracing::debug!(
            %user_id,
            %guild_id,
            ttl_secs = self.access_ttl.as_secs(),
            "Cached channel access"
        );
    }

    /// Role permission table for a guild, if cached.
    pub async fn role_permissions(&self, guild_id: Snowflake) -> Option<Arc<RolePermissionTable>> {
        let hit = self.roles.get(&guild_id).await;
        if hit.is_some() {
            tracing::debug!(%guild_id, "Using cached guild roles");
        }
        hit
    }

    pub async fn store_role_permissions(&self, guild_id: Snowflake, table: Arc<RolePermissionTable>) {
        self.roles.put(guild_id, table, self.role_ttl).await;
        tracing::debug!(
            %guild_id,
            ttl_secs = self.role_ttl.as_secs(),
            "Cached guild roles"
        );
    }
}
