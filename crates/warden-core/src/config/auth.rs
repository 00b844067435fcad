//! Token signing configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::duration::{self, DurationUnit};
use crate::error::AppError;

/// Bearer-token signing and verification configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret. Either base64 that decodes to at least
    /// 32 bytes, or at least 32 bytes of UTF-8 text.
    #[serde(default)]
    pub jwt_secret: String,
    /// Value written to and required in the `iss` claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Value written to and required in the `aud` claim. Blank means unset.
    #[serde(default)]
    pub jwt_audience: Option<String>,
    /// Allowed clock skew in seconds for `iat`/`exp` comparisons.
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
}

impl AuthConfig {
    /// Returns the configured audience, treating blank values as unset.
    pub fn audience(&self) -> Option<&str> {
        self.jwt_audience
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Allowed clock skew. Zero is permitted.
    pub fn clock_skew(&self) -> Result<TimeDelta, AppError> {
        duration::bounded(
            "auth.clock_skew_seconds",
            self.clock_skew_seconds,
            DurationUnit::Seconds,
        )
    }

    /// Access token lifetime. Must be positive.
    pub fn access_ttl(&self) -> Result<TimeDelta, AppError> {
        duration::positive(
            "auth.access_ttl_minutes",
            self.access_ttl_minutes,
            DurationUnit::Minutes,
        )
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            jwt_audience: None,
            clock_skew_seconds: default_clock_skew(),
            access_ttl_minutes: default_access_ttl(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

fn default_issuer() -> String {
    "warden".to_string()
}

fn default_clock_skew() -> u64 {
    30
}

fn default_access_ttl() -> u64 {
    15
}
