//! Sliding-window rate limiting for the forgot-password flow.

pub mod window;

pub use window::{LimitClass, RateLimiter};
