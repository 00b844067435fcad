//! Bearer token verification failures.

use thiserror::Error;

use warden_core::error::{AppError, ErrorKind};

/// Reasons a token could not be issued or was rejected.
///
/// Callers on the request path treat every verification variant as "no
/// bearer present"; the distinction exists for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed, badly signed, or missing required claims.
    #[error("token is invalid: {0}")]
    Invalid(String),
    /// Expiry is in the past beyond the allowed clock skew.
    #[error("token has expired")]
    Expired,
    /// Audience claim absent or different from the configured audience.
    #[error("token audience does not match")]
    AudienceMismatch,
    /// Issuer claim absent or different from the configured issuer.
    #[error("token issuer does not match")]
    IssuerMismatch,
    /// A custom claim tried to overwrite a registered claim.
    #[error("claim '{0}' is reserved")]
    ReservedClaim(String),
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Short machine-readable reason for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::Expired => "expired",
            Self::AudienceMismatch => "audience_mismatch",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::ReservedClaim(_) => "reserved_claim",
            Self::Encoding(_) => "encoding",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let kind = match err {
            TokenError::ReservedClaim(_) => ErrorKind::Validation,
            TokenError::Encoding(_) => ErrorKind::Internal,
            _ => ErrorKind::Unauthorized,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
