//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use warden_core::types::NormalizedEmail;

use super::role::Role;

/// A registered identity that can log in and reset its password.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: Uuid,
    /// Canonical (trimmed, lower-cased) email address. Unique.
    pub email: String,
    /// Argon2 PHC-format password hash. Never plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Granted role names. Never empty.
    pub roles: Vec<String>,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
    /// When the principal was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Check whether the principal holds `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role.as_str()))
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Data required to create a new principal.
#[derive(Clone)]
pub struct NewPrincipal {
    /// Canonical email.
    pub email: NormalizedEmail,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Initial roles. Empty input is replaced by the base role.
    pub roles: Vec<String>,
}

impl NewPrincipal {
    /// Creates a principal request carrying only the base role.
    pub fn new(email: NormalizedEmail, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            first_name: None,
            last_name: None,
            roles: vec![Role::User.as_str().to_string()],
        }
    }

    /// Builds the row to persist, stamping timestamps and a fresh id.
    pub fn into_principal(self, now: DateTime<Utc>) -> Principal {
        let roles = if self.roles.is_empty() {
            vec![Role::User.as_str().to_string()]
        } else {
            self.roles
        };

        Principal {
            id: Uuid::now_v7(),
            email: self.email.into_string(),
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            roles,
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}
