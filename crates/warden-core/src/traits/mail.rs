//! Mail dispatch trait for password-reset emails.

use async_trait::async_trait;

use crate::result::AppResult;

/// Delivers the password-reset email.
///
/// Transport and rendering belong to the implementor. The reset flow logs
/// failures from this trait and never surfaces them to the requester.
#[async_trait]
pub trait MailDispatcher: Send + Sync + std::fmt::Debug + 'static {
    /// Send a reset link to `to`, rendered for `locale`.
    async fn send_reset_link(&self, to: &str, reset_link: &str, locale: &str) -> AppResult<()>;
}
