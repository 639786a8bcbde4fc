//! Rate limiting configuration.

use std::path::PathBuf;

/// Configuration for the refresh rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// File holding the persisted event log
    pub log_path: PathBuf,
    /// Refresh admission limit
    pub refresh: LimitConfig,
}

/// Configuration for a single rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    /// Maximum requests allowed in the window
    pub requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: PathBuf::from("rate_limit.json"),
            refresh: LimitConfig {
                requests: 3,
                window_secs: 3600,
            },
        }
    }
}

impl RateLimitConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_ENABLED`: Enable/disable rate limiting (default: true)
    /// - `RATE_LIMIT_FILE`: Path of the persisted log (default: "rate_limit.json")
    /// - `RATE_LIMIT_REFRESH`: Refresh limit as "requests,window_secs" (default: "3,3600")
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RATE_LIMIT_ENABLED") {
            config.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_FILE") {
            config.log_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_REFRESH") {
            if let Some(limit) = parse_limit_config(&val) {
                config.refresh = limit;
            } else {
                tracing::warn!(value = %val, "Ignoring malformed RATE_LIMIT_REFRESH");
            }
        }

        config
    }
}

/// Parses a limit config from "requests,window_secs" format.
fn parse_limit_config(val: &str) -> Option<LimitConfig> {
    let parts: Vec<&str> = val.split(',').collect();
    if parts.len() == 2 {
        let requests = parts[0].trim().parse().ok()?;
        let window_secs = parts[1].trim().parse().ok()?;
        Some(LimitConfig {
            requests,
            window_secs,
        })
    } else {
        None
    }
}
