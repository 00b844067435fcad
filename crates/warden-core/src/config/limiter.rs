//! Forgot-password rate limit configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::duration::{self, DurationUnit};
use crate::error::AppError;

/// Sliding-window limits for the forgot-password flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Window length in seconds, shared by both key classes.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Maximum requests per requester IP within the window.
    #[serde(default = "default_max_per_ip")]
    pub max_per_ip: usize,
    /// Maximum requests per normalized email within the window.
    #[serde(default = "default_max_per_email")]
    pub max_per_email: usize,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window(),
            max_per_ip: default_max_per_ip(),
            max_per_email: default_max_per_email(),
        }
    }
}

impl LimiterConfig {
    /// Window length. Must be positive.
    pub fn window(&self) -> Result<TimeDelta, AppError> {
        duration::positive(
            "limiter.window_seconds",
            self.window_seconds,
            DurationUnit::Seconds,
        )
    }
}

fn default_window() -> u64 {
    900
}

fn default_max_per_ip() -> usize {
    10
}

fn default_max_per_email() -> usize {
    3
}
