//! Stateless token sessions.

pub mod cookie;
pub mod manager;

pub use cookie::SessionCookies;
pub use manager::{Authentication, LoginResult, RegisterRequest, SessionManager};
