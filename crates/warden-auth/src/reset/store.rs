//! Issuing, consuming and sweeping single-use reset tokens.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, info};
use uuid::Uuid;

use warden_core::config::ResetConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::ResetTokenRepository;
use warden_entity::{ConsumeOutcome, Principal, ResetToken};

/// Minimum random bytes per token (256 bits).
pub const MIN_TOKEN_BYTES: usize = 32;

/// Rows removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Tokens removed because their expiry passed.
    pub expired: u64,
    /// Used tokens removed because they aged past the retention.
    pub used: u64,
}

impl SweepReport {
    /// Total rows removed.
    pub fn total(&self) -> u64 {
        self.expired + self.used
    }
}

/// Lifecycle manager for reset tokens over a [`ResetTokenRepository`].
#[derive(Debug, Clone)]
pub struct ResetTokenStore {
    repo: Arc<dyn ResetTokenRepository>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    token_bytes: usize,
}

impl ResetTokenStore {
    /// Creates a store. Rejects token sizes below 256 bits and lifetimes
    /// that are zero or out of range.
    pub fn new(
        config: &ResetConfig,
        repo: Arc<dyn ResetTokenRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        if config.token_bytes < MIN_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "reset.token_bytes must be at least {MIN_TOKEN_BYTES}"
            )));
        }

        Ok(Self {
            repo,
            clock,
            ttl: config.token_ttl()?,
            token_bytes: config.token_bytes,
        })
    }

    /// Generates and persists a new token for `principal`.
    pub async fn issue(&self, principal: &Principal) -> AppResult<ResetToken> {
        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            AppError::internal(format!("reset token ttl {} out of range", self.ttl))
        })?;
        let token = ResetToken {
            id: Uuid::now_v7(),
            token: generate_token(self.token_bytes),
            principal_id: principal.id,
            expires_at,
            used_at: None,
            created_at: now,
        };

        self.repo.insert(&token).await?;
        debug!(principal_id = %principal.id, expires_at = %token.expires_at, "Reset token issued");
        Ok(token)
    }

    /// Fetches a token in any state.
    pub async fn lookup(&self, token: &str) -> AppResult<Option<ResetToken>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.repo.find_by_token(token).await
    }

    /// Whether `token` exists, is unused and has not expired.
    pub async fn is_consumable(&self, token: &str) -> AppResult<bool> {
        Ok(self
            .lookup(token)
            .await?
            .is_some_and(|t| t.is_consumable_at(self.clock.now())))
    }

    /// Spends `token` and installs `password_hash` for its principal, both or
    /// neither. The outcome names the precise failure reason.
    pub async fn consume(&self, token: &str, password_hash: &str) -> AppResult<ConsumeOutcome> {
        if token.is_empty() {
            return Ok(ConsumeOutcome::NotFound);
        }
        self.repo
            .consume(token, password_hash, self.clock.now())
            .await
    }

    /// Deletes expired tokens and used tokens older than `used_retention`.
    pub async fn sweep(&self, used_retention: Duration) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let used_cutoff = now.checked_sub_signed(used_retention).ok_or_else(|| {
            AppError::internal(format!("used token retention {used_retention} out of range"))
        })?;
        let expired = self.repo.delete_expired(now).await?;
        let used = self.repo.delete_used_before(used_cutoff).await?;

        let report = SweepReport { expired, used };
        if report.total() > 0 {
            info!(expired, used, "Swept reset tokens");
        }
        Ok(report)
    }
}

/// `len` bytes from the OS CSPRNG, URL-safe base64 without padding.
fn generate_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
