//! Token claims payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered claim names that custom claims may not use.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "iss", "aud", "iat", "exp", "nbf", "jti"];

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject. For session tokens this is the canonical email.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Audience, when one is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Application claims carried alongside the registered ones.
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    /// Token subject.
    pub subject: String,
    /// Custom claims exactly as issued.
    pub claims: Map<String, Value>,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires, before skew.
    pub expires_at: DateTime<Utc>,
}

impl VerifiedToken {
    /// Read a custom claim as a list of strings, e.g. `roles`.
    pub fn string_list(&self, name: &str) -> Vec<String> {
        self.claims
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
