//! Password-reset orchestration.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use warden_auth::{LimitClass, PasswordHasher, PasswordPolicy, RateLimiter, ResetTokenStore};
use warden_core::config::ResetConfig;
use warden_core::error::AppError;
use warden_core::traits::MailDispatcher;
use warden_core::types::NormalizedEmail;
use warden_database::PrincipalRepository;
use warden_entity::ConsumeOutcome;

use super::outcome::{ForgotPasswordOutcome, ResetPasswordOutcome};

/// Append `token` to `base` as the `token` query parameter.
///
/// Tokens are URL-safe base64, so no escaping is needed.
pub fn build_reset_link(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}token={token}")
}

/// Everything the detached dispatch task needs.
#[derive(Debug, Clone)]
struct Dispatch {
    principals: Arc<dyn PrincipalRepository>,
    tokens: ResetTokenStore,
    mailer: Arc<dyn MailDispatcher>,
    link_base_url: String,
}

impl Dispatch {
    /// Look up the principal, issue a token and send the mail. Every
    /// failure ends here as a log line.
    async fn run(self, email: NormalizedEmail, locale: String) {
        let principal = match self.principals.find_by_email(&email).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!(email = %email, "Forgot-password for unknown email");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Principal lookup failed during forgot-password");
                return;
            }
        };

        let token = match self.tokens.issue(&principal).await {
            Ok(t) => t,
            Err(e) => {
                warn!(principal_id = %principal.id, error = %e, "Failed to issue reset token");
                return;
            }
        };

        let link = build_reset_link(&self.link_base_url, &token.token);
        match self
            .mailer
            .send_reset_link(&principal.email, &link, &locale)
            .await
        {
            Ok(()) => info!(principal_id = %principal.id, "Reset email dispatched"),
            Err(e) => warn!(principal_id = %principal.id, error = %e, "Reset email failed"),
        }
    }
}

/// Forgot-password and reset-password use cases.
#[derive(Debug)]
pub struct PasswordResetService {
    dispatch: Dispatch,
    limiter: Arc<RateLimiter>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    default_locale: String,
    pending: Mutex<JoinSet<()>>,
}

impl PasswordResetService {
    /// Creates the service. `policy` is the general password policy; the
    /// reset flow applies `reset.min_password_length` on top when set.
    pub fn new(
        config: &ResetConfig,
        principals: Arc<dyn PrincipalRepository>,
        tokens: ResetTokenStore,
        limiter: Arc<RateLimiter>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
        mailer: Arc<dyn MailDispatcher>,
    ) -> Result<Self, AppError> {
        if config.link_base_url.trim().is_empty() {
            return Err(AppError::configuration("reset.link_base_url must be set"));
        }

        let policy = match config.min_password_length {
            Some(min) => policy.with_min_length(min)?,
            None => policy,
        };

        Ok(Self {
            dispatch: Dispatch {
                principals,
                tokens,
                mailer,
                link_base_url: config.link_base_url.trim().to_string(),
            },
            limiter,
            hasher,
            policy,
            default_locale: config.default_locale.clone(),
            pending: Mutex::new(JoinSet::new()),
        })
    }

    /// Starts a password reset for `email`.
    ///
    /// Always returns [`ForgotPasswordOutcome::Accepted`]. Lookup, token
    /// issuance and mail run in a detached task, so the response does not
    /// wait on whether the account exists.
    pub async fn forgot_password(
        &self,
        email: &str,
        requester_ip: &str,
        locale: Option<&str>,
    ) -> ForgotPasswordOutcome {
        let email = NormalizedEmail::new(email);

        // Both windows record the attempt, even when the first refuses.
        let ip_allowed = self.limiter.allow(requester_ip, LimitClass::PerIp);
        let email_allowed =
            !email.is_blank() && self.limiter.allow(email.as_str(), LimitClass::PerEmail);

        if !ip_allowed || !email_allowed {
            debug!(
                ip_allowed,
                email_allowed,
                "Forgot-password suppressed by rate limit or blank email"
            );
            return ForgotPasswordOutcome::Accepted;
        }

        let locale = locale
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_locale)
            .to_string();

        let mut pending = self.pending.lock().await;
        while pending.try_join_next().is_some() {}
        pending.spawn(self.dispatch.clone().run(email, locale));

        ForgotPasswordOutcome::Accepted
    }

    /// Completes a reset with `token`, setting `new_password`.
    ///
    /// A token that is already unusable is refused before the password is
    /// hashed. The consume that follows still decides the race between
    /// concurrent resets.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ResetPasswordOutcome {
        if let Err(violations) = self.policy.validate(new_password) {
            debug!(count = violations.len(), "Reset rejected by password policy");
            return ResetPasswordOutcome::Rejected(violations);
        }

        let token = token.trim();
        match self.dispatch.tokens.is_consumable(token).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Password reset refused before hashing");
                return ResetPasswordOutcome::InvalidToken;
            }
            Err(e) => {
                warn!(error = %e, "Reset token lookup failed");
                return ResetPasswordOutcome::InvalidToken;
            }
        }

        let hash = match self
            .hasher
            .hash_password_blocking(new_password.to_string())
            .await
        {
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "Password hashing failed during reset");
                return ResetPasswordOutcome::InvalidToken;
            }
        };

        match self.dispatch.tokens.consume(token, &hash).await {
            Ok(ConsumeOutcome::Consumed { principal_id }) => {
                info!(principal_id = %principal_id, "Password reset completed");
                ResetPasswordOutcome::Completed
            }
            Ok(other) => {
                warn!(reason = other.reason(), "Password reset refused");
                ResetPasswordOutcome::InvalidToken
            }
            Err(e) => {
                warn!(error = %e, "Password reset failed in storage");
                ResetPasswordOutcome::InvalidToken
            }
        }
    }

    /// Whether `token` is currently consumable. For pre-filling a reset form.
    pub async fn token_is_valid(&self, token: &str) -> bool {
        match self.dispatch.tokens.is_consumable(token.trim()).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Reset token lookup failed");
                false
            }
        }
    }

    /// Waits for every in-flight dispatch task to finish.
    pub async fn drain(&self) {
        let mut pending = std::mem::take(&mut *self.pending.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Reset dispatch task aborted");
            }
        }
    }
}
