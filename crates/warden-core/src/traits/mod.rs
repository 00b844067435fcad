//! Core traits defined in `warden-core` and implemented by other crates
//! or by the host application.

pub mod clock;
pub mod mail;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mail::MailDispatcher;
