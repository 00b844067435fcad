//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the maintenance scheduler runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for the reset-token and
    /// rate-limiter sweep.
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup_cron: default_cleanup_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cleanup_cron() -> String {
    "0 */15 * * * *".to_string()
}
