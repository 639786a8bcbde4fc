//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::permissions::{DEFAULT_ACCESS_TTL, DEFAULT_ROLE_TTL};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1:8080")
    pub bind_address: String,

    /// Upstream chat platform API root
    pub upstream_api_base: String,

    /// Per-request upstream timeout (default: 30s)
    pub upstream_timeout: Duration,

    /// Lifetime of a user's accessible-channel set (default: 2 hours)
    pub access_cache_ttl: Duration,

    /// Lifetime of a guild role permission table (default: 24 hours)
    pub role_cache_ttl: Duration,

    /// How long a verified token is trusted before asking upstream again
    /// (default: 5 minutes)
    pub session_cache_ttl: Duration,
}

/// Default lifetime of a verified token.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(5 * 60);

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            upstream_api_base: env::var("UPSTREAM_API_BASE")
                .unwrap_or_else(|_| "https://discord.com/api/v9".into()),
            upstream_timeout: secs_var("UPSTREAM_TIMEOUT_SECS")?
                .unwrap_or(Duration::from_secs(30)),
            access_cache_ttl: secs_var("ACCESS_CACHE_TTL_SECS")?.unwrap_or(DEFAULT_ACCESS_TTL),
            role_cache_ttl: secs_var("ROLE_CACHE_TTL_SECS")?.unwrap_or(DEFAULT_ROLE_TTL),
            session_cache_ttl: secs_var("SESSION_CACHE_TTL_SECS")?.unwrap_or(DEFAULT_SESSION_TTL),
        })
    }

    /// Create a default configuration for testing.
    ///
    /// Points the upstream at `upstream_api_base`, typically a local mock server.
    #[must_use]
    pub fn default_for_test(upstream_api_base: &str) -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            upstream_api_base: upstream_api_base.into(),
            upstream_timeout: Duration::from_secs(5),
            access_cache_ttl: DEFAULT_ACCESS_TTL,
            role_cache_ttl: DEFAULT_ROLE_TTL,
            session_cache_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// Reads an optional duration in whole seconds.
fn secs_var(name: &str) -> Result<Option<Duration>> {
    env::var(name)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("{name} must be a number of seconds"))
        })
        .transpose()
}
