//! Rate limiting types.

use serde::{Deserialize, Serialize};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in the window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Seconds to wait before retrying (0 if allowed)
    pub retry_after: u64,
}

impl RateLimitResult {
    pub(crate) const fn allow(limit: u32, remaining: u32) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            retry_after: 0,
        }
    }

    pub(crate) const fn deny(limit: u32, retry_after: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            retry_after,
        }
    }

    /// Human-readable wait, e.g. `"1h 5m"`.
    ///
    /// ```
    /// use archive_server::ratelimit::RateLimitResult;
    ///
    /// let result = RateLimitResult { allowed: false, limit: 3, remaining: 0, retry_after: 3900 };
    /// assert_eq!(result.wait_display(), "1h 5m");
    /// ```
    pub fn wait_display(&self) -> String {
        let hours = self.retry_after / 3600;
        let minutes = (self.retry_after % 3600) / 60;
        format!("{hours}h {minutes}m")
    }
}

/// Persisted event log, `{ "timestamps": [...] }` in epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitLog {
    #[serde(default)]
    pub timestamps: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_display_rounds_down_to_minutes() {
        assert_eq!(RateLimitResult::deny(3, 0).wait_display(), "0h 0m");
        assert_eq!(RateLimitResult::deny(3, 59).wait_display(), "0h 0m");
        assert_eq!(RateLimitResult::deny(3, 3599).wait_display(), "0h 59m");
        assert_eq!(RateLimitResult::deny(3, 7260).wait_display(), "2h 1m");
    }

    #[test]
    fn test_log_format() {
        let log = RateLimitLog {
            timestamps: vec![1_700_000_000, 1_700_000_010],
        };
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"{"timestamps":[1700000000,1700000010]}"#);

        let empty: RateLimitLog = serde_json::from_str("{}").unwrap();
        assert!(empty.timestamps.is_empty());
    }
}
