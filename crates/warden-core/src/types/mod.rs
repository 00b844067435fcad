//! Shared value types.

pub mod email;

pub use email::NormalizedEmail;
