//! # warden-auth
//!
//! Authentication building blocks for Warden.
//!
//! ## Modules
//!
//! - `jwt` — signed bearer token issuance and verification
//! - `password` — Argon2id hashing and strong-password policy
//! - `limiter` — sliding-window rate limiting keyed by IP or email
//! - `reset` — single-use password-reset token lifecycle
//! - `session` — login, request authentication, logout and registration

pub mod jwt;
pub mod limiter;
pub mod password;
pub mod reset;
pub mod session;

pub use jwt::{JwtCodec, TokenError, VerifiedToken};
pub use limiter::{LimitClass, RateLimiter};
pub use password::{PasswordHasher, PasswordPolicy, PolicyViolation};
pub use reset::{ResetTokenStore, SweepReport};
pub use session::{Authentication, LoginResult, RegisterRequest, SessionCookies, SessionManager};
