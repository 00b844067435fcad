//! Forgot-password and reset-password flows.

pub mod outcome;
pub mod service;

pub use outcome::{ForgotPasswordOutcome, ResetPasswordOutcome};
pub use service::{PasswordResetService, build_reset_link};
