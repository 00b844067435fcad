//! Scheduled maintenance for Warden.
//!
//! This crate provides:
//! - A cron scheduler that owns the periodic tasks
//! - The singleton cleanup job that sweeps reset tokens and compacts the
//!   rate limiter

pub mod jobs;
pub mod scheduler;

pub use jobs::{CleanupJob, CleanupReport};
pub use scheduler::CronScheduler;
