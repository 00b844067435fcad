//! Reset-token sweep and rate-limiter compaction.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing;

use warden_auth::{RateLimiter, ResetTokenStore};
use warden_core::config::ResetConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Counts from one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired reset tokens deleted.
    pub expired: u64,
    /// Used reset tokens deleted after the retention period.
    pub used: u64,
    /// Rate-limiter keys evicted.
    pub evicted_keys: usize,
}

/// Periodic maintenance. Runs are serialized; a tick that arrives while a
/// run is in progress is skipped.
#[derive(Debug)]
pub struct CleanupJob {
    tokens: ResetTokenStore,
    limiter: Arc<RateLimiter>,
    used_retention: Duration,
    running: Mutex<()>,
}

impl CleanupJob {
    /// Create a new cleanup job.
    pub fn new(
        config: &ResetConfig,
        tokens: ResetTokenStore,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            tokens,
            limiter,
            used_retention: config.used_retention()?,
            running: Mutex::new(()),
        })
    }

    /// Run once unless another run holds the guard.
    ///
    /// Returns `Ok(None)` when skipped. The limiter is compacted even when the
    /// token sweep fails.
    pub async fn run_once(&self) -> AppResult<Option<CleanupReport>> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("Cleanup still running, skipping this tick");
            return Ok(None);
        };

        let sweep = self.tokens.sweep(self.used_retention).await;
        let evicted_keys = self.limiter.cleanup();

        let sweep = match sweep {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, evicted_keys, "Reset token sweep failed");
                return Err(e);
            }
        };

        let report = CleanupReport {
            expired: sweep.expired,
            used: sweep.used,
            evicted_keys,
        };
        tracing::info!(
            expired = report.expired,
            used = report.used,
            evicted_keys = report.evicted_keys,
            "Cleanup completed"
        );
        Ok(Some(report))
    }
}
