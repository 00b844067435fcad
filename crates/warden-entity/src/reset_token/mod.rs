//! Password-reset token entity and consumption outcomes.

pub mod model;
pub mod outcome;

pub use model::ResetToken;
pub use outcome::ConsumeOutcome;
