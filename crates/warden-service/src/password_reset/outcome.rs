//! Caller-visible results of the reset flows.

use http::StatusCode;

use warden_auth::PolicyViolation;

/// Result of a forgot-password request.
///
/// There is one variant on purpose: unknown email, rate limiting, mail
/// failure and success all look the same to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgotPasswordOutcome {
    /// The request was accepted for processing.
    Accepted,
}

impl ForgotPasswordOutcome {
    /// HTTP status for the outward response.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        "If an account exists for that email, a reset link has been sent."
    }
}

/// Result of a reset-password request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetPasswordOutcome {
    /// The password was changed and the token spent.
    Completed,
    /// Token unknown, already used, expired, or the store failed. Not
    /// distinguished outward.
    InvalidToken,
    /// The new password failed the policy. Specific reasons are safe to show.
    Rejected(Vec<PolicyViolation>),
}

impl ResetPasswordOutcome {
    /// HTTP status for the outward response. Never 404 or 409.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Completed => StatusCode::OK,
            Self::InvalidToken | Self::Rejected(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// User-facing messages.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Completed => vec!["Your password has been reset.".to_string()],
            Self::InvalidToken => vec!["This reset link is invalid or has expired.".to_string()],
            Self::Rejected(violations) => violations.iter().map(ToString::to_string).collect(),
        }
    }

    /// Whether the password was changed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
