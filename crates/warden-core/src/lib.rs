//! # warden-core
//!
//! Core crate for Warden. Contains configuration schemas, the unified
//! error system, the clock and mail-dispatch traits consumed by the
//! authentication services, and small shared value types.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
