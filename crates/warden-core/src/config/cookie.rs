//! Session cookie configuration.

use serde::{Deserialize, Serialize};

/// Attributes of the cookie that carries the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,
    /// Whether the `Secure` attribute is set.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            path: default_path(),
            secure: true,
            same_site: SameSitePolicy::default(),
        }
    }
}

/// `SameSite` cookie attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSitePolicy {
    /// Sent only on same-site requests.
    Strict,
    /// Sent on same-site requests and top-level navigations.
    #[default]
    Lax,
    /// Sent on all requests; browsers require `Secure` with this value.
    None,
}

impl std::fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSitePolicy::Strict => write!(f, "strict"),
            SameSitePolicy::Lax => write!(f, "lax"),
            SameSitePolicy::None => write!(f, "none"),
        }
    }
}

fn default_name() -> String {
    "access_token".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
