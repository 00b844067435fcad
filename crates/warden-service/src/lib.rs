//! # warden-service
//!
//! Use-case layer for Warden. The password-reset service orchestrates the
//! rate limiter, principal store, reset-token store, password policy and
//! mail dispatcher behind an outward contract that never reveals whether
//! an account exists.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod mail;
pub mod password_reset;
pub mod state;

pub use mail::LogMailDispatcher;
pub use password_reset::{ForgotPasswordOutcome, PasswordResetService, ResetPasswordOutcome};
pub use state::AppState;
