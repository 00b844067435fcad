//! Password-reset flow configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::duration::{self, DurationUnit};
use crate::error::AppError;

/// Reset-token lifetime, retention, and link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Lifetime of a reset token from creation, in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Random bytes per token before encoding. Must be at least 32.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// Days a consumed token is kept before the sweep deletes it.
    #[serde(default = "default_used_retention")]
    pub used_retention_days: u64,
    /// Front-end page that receives `?token=...`.
    #[serde(default = "default_link_base_url")]
    pub link_base_url: String,
    /// Overrides the policy minimum length for passwords set via reset.
    #[serde(default)]
    pub min_password_length: Option<usize>,
    /// Locale passed to the mail dispatcher when the caller supplies none.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: default_token_ttl(),
            token_bytes: default_token_bytes(),
            used_retention_days: default_used_retention(),
            link_base_url: default_link_base_url(),
            min_password_length: None,
            default_locale: default_locale(),
        }
    }
}

impl ResetConfig {
    /// Reset token lifetime. Must be positive.
    pub fn token_ttl(&self) -> Result<TimeDelta, AppError> {
        duration::positive(
            "reset.token_ttl_minutes",
            self.token_ttl_minutes,
            DurationUnit::Minutes,
        )
    }

    /// How long consumed tokens are kept. Zero removes them on the next sweep.
    pub fn used_retention(&self) -> Result<TimeDelta, AppError> {
        duration::bounded(
            "reset.used_retention_days",
            self.used_retention_days,
            DurationUnit::Days,
        )
    }
}

fn default_token_ttl() -> u64 {
    30
}

fn default_token_bytes() -> usize {
    48
}

fn default_used_retention() -> u64 {
    7
}

fn default_link_base_url() -> String {
    "http://localhost:8081/reset-password".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}
