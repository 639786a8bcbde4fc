//! Core rate limiter service backed by a JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::ratelimit::{RateLimitConfig, RateLimitLog, RateLimitResult};

/// Sliding-window rate limiter with a persisted event log.
///
/// Every check loads the log, drops events that left the window, decides,
/// and on admission appends the current time and rewrites the file. The
/// whole sequence runs under one lock so concurrent checks in this process
/// never admit more than the limit.
///
/// Storage problems never block a decision: an unreadable log counts as
/// empty and a failed write is logged and ignored.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    lock: Arc<Mutex<()>>,
}

impl RateLimiter {
    /// Creates a new rate limiter instance.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Checks the limit and records an event if admitted.
    ///
    /// Returns `allowed: false` with `retry_after` set to the seconds until
    /// the oldest event in the window expires.
    pub async fn check_and_record(&self) -> RateLimitResult {
        self.check_and_record_at(chrono::Utc::now().timestamp()).await
    }

    /// Same as [`check_and_record`](Self::check_and_record) with an explicit
    /// clock reading in epoch seconds.
    #[tracing::instrument(skip(self))]
    pub async fn check_and_record_at(&self, now: i64) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::allow(0, 0);
        }

        let limit = self.config.refresh;
        let window = i64::try_from(limit.window_secs).unwrap_or(i64::MAX);

        let _guard = self.lock.lock().await;

        let log = load_log(&self.config.log_path).await;
        let mut retained: Vec<i64> = log
            .timestamps
            .into_iter()
            .filter(|ts| *ts <= now && now.saturating_sub(*ts) < window)
            .collect();

        if retained.len() >= limit.requests as usize {
            let oldest = retained.iter().min().copied().unwrap_or(now);
            let retry_after = window.saturating_sub(now - oldest).max(0) as u64;
            info!(
                events = retained.len(),
                limit = limit.requests,
                retry_after,
                "Refresh rate limit exceeded"
            );
            return RateLimitResult::deny(limit.requests, retry_after);
        }

        retained.push(now);
        let remaining = limit.requests.saturating_sub(retained.len() as u32);

        let log = RateLimitLog {
            timestamps: retained,
        };
        if let Err(e) = store_log(&self.config.log_path, &log).await {
            warn!(
                path = %self.config.log_path.display(),
                error = %e,
                "Failed to persist rate limit log"
            );
        }

        debug!(remaining, "Refresh admitted");
        RateLimitResult::allow(limit.requests, remaining)
    }
}

/// Reads the persisted log, treating any failure as an empty history.
async fn load_log(path: &Path) -> RateLimitLog {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return RateLimitLog::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read rate limit log");
            return RateLimitLog::default();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Rate limit log is corrupt, starting empty");
        RateLimitLog::default()
    })
}

/// Writes the log to a sibling temp file, syncs it, and renames it into
/// place so a crash leaves either the old or the new log on disk.
async fn store_log(path: &Path, log: &RateLimitLog) -> std::io::Result<()> {
    let bytes = serde_json::to_vec(log)?;
    let tmp = temp_path(path);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
