//! Result of an atomic reset-token consumption.

use uuid::Uuid;

/// What happened when a reset token was presented for consumption.
///
/// Only [`ConsumeOutcome::Consumed`] means the password was changed. The
/// other variants are kept distinct for logging; callers facing the
/// requester collapse them into a single rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The token was valid and is now spent. The principal's password hash
    /// has been replaced in the same unit of work.
    Consumed {
        /// The principal whose password changed.
        principal_id: Uuid,
    },
    /// No token with that value exists.
    NotFound,
    /// The token was already consumed.
    AlreadyUsed,
    /// The token's expiry has passed.
    Expired,
}

impl ConsumeOutcome {
    /// Returns `true` only for a successful consumption.
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed { .. })
    }

    /// Short machine-readable reason for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Consumed { .. } => "consumed",
            Self::NotFound => "not_found",
            Self::AlreadyUsed => "already_used",
            Self::Expired => "expired",
        }
    }
}
