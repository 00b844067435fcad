//! # warden-entity
//!
//! Domain entity models for Warden. Every struct in this crate represents
//! a database table row or a domain value object. Row types derive
//! `sqlx::FromRow`.

pub mod principal;
pub mod reset_token;

pub use principal::{NewPrincipal, Principal, Role};
pub use reset_token::{ConsumeOutcome, ResetToken};
