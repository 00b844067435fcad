//! Reset token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single-use, time-limited credential authorizing one password change.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct ResetToken {
    /// Row identifier.
    pub id: Uuid,
    /// Opaque URL-safe token value. Unique.
    pub token: String,
    /// Principal the token was issued for.
    pub principal_id: Uuid,
    /// Instant after which the token can no longer be consumed.
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, when the token is consumed.
    pub used_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Whether the token has been consumed.
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unused and not yet expired.
    pub fn is_consumable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired_at(now)
    }
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("principal_id", &self.principal_id)
            .field("expires_at", &self.expires_at)
            .field("used_at", &self.used_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}
