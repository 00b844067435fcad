//! # warden-database
//!
//! Persistence for principals and password-reset tokens. Defines the
//! repository traits consumed by the auth services, a PostgreSQL
//! implementation backed by sqlx, and an in-memory implementation used
//! for embedded deployments and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use repositories::{
    PgPrincipalRepository, PgResetTokenRepository, PrincipalRepository, ResetTokenRepository,
};
