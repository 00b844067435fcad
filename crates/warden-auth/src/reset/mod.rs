//! Password-reset token lifecycle.

pub mod store;

pub use store::{ResetTokenStore, SweepReport};
