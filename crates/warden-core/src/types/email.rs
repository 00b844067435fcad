//! Canonical email addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An email address in canonical form: trimmed and lower-cased.
///
/// This is the form used for every lookup, the uniqueness constraint, and
/// the per-email rate-limit key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Normalizes a raw address.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Returns `true` when nothing remains after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
