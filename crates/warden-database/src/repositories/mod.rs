//! Repository traits and their PostgreSQL implementations.

pub mod principal;
pub mod reset_token;

pub use principal::{PgPrincipalRepository, PrincipalRepository};
pub use reset_token::{PgResetTokenRepository, ResetTokenRepository};
