//! Shared application state wiring.

use std::sync::Arc;

use warden_auth::{
    JwtCodec, PasswordHasher, PasswordPolicy, RateLimiter, ResetTokenStore, SessionCookies,
    SessionManager,
};
use warden_core::config::AppConfig;
use warden_core::result::AppResult;
use warden_core::traits::{Clock, MailDispatcher};
use warden_database::{PrincipalRepository, ResetTokenRepository};

use crate::password_reset::PasswordResetService;

/// Every long-lived service, built once at start-up and shared by handle.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Login, authentication, logout and registration.
    pub sessions: Arc<SessionManager>,
    /// Forgot-password and reset-password.
    pub password_reset: Arc<PasswordResetService>,
    /// Reset-token lifecycle, shared with the maintenance job.
    pub reset_tokens: ResetTokenStore,
    /// Forgot-password rate limiter, shared with the maintenance job.
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build the service graph. Fails fast on any configuration error,
    /// including a missing or weak signing key.
    pub fn build(
        config: AppConfig,
        principals: Arc<dyn PrincipalRepository>,
        reset_tokens: Arc<dyn ResetTokenRepository>,
        mailer: Arc<dyn MailDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let codec = Arc::new(JwtCodec::new(&config.auth, clock.clone())?);
        let hasher = PasswordHasher::new(&config.password)?;
        let policy = PasswordPolicy::new(&config.password)?;
        let limiter = Arc::new(RateLimiter::new(&config.limiter, clock.clone())?);
        let token_store = ResetTokenStore::new(&config.reset, reset_tokens, clock.clone())?;

        let sessions = SessionManager::new(
            principals.clone(),
            codec,
            hasher.clone(),
            policy.clone(),
            SessionCookies::new(&config.cookie),
            clock,
            &config.auth,
        )?;

        let password_reset = PasswordResetService::new(
            &config.reset,
            principals,
            token_store.clone(),
            limiter.clone(),
            hasher,
            policy,
            mailer,
        )?;

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            password_reset: Arc::new(password_reset),
            reset_tokens: token_store,
            limiter,
        })
    }
}
