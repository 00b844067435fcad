//! Development mail dispatcher.

use async_trait::async_trait;
use tracing::{debug, info};

use warden_core::result::AppResult;
use warden_core::traits::MailDispatcher;

/// Logs reset emails instead of sending them.
///
/// The token is stripped from the logged link and the recipient address
/// only appears at debug level.
#[derive(Debug, Clone, Default)]
pub struct LogMailDispatcher;

#[async_trait]
impl MailDispatcher for LogMailDispatcher {
    async fn send_reset_link(&self, to: &str, reset_link: &str, locale: &str) -> AppResult<()> {
        let target = reset_link.split('?').next().unwrap_or_default();
        debug!(to = %to, "Reset email recipient");
        info!(locale = %locale, target = %target, "Reset email send stub");
        Ok(())
    }
}
