//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden_auth::RegisterRequest;
use warden_core::config::{AppConfig, PasswordConfig};
use warden_core::result::AppResult;
use warden_core::traits::{ManualClock, MailDispatcher};
use warden_database::MemoryDatabase;
use warden_entity::Principal;
use warden_service::AppState;

/// Signing key used by every test application.
pub const TEST_SECRET: &str = "integration-test-signing-key-0123456789abcdef";

/// A sent reset email.
#[derive(Debug, Clone)]
pub struct SentMail {
    /// Recipient.
    pub to: String,
    /// Full reset link, token included.
    pub link: String,
    /// Locale the mail was rendered for.
    pub locale: String,
}

impl SentMail {
    /// Token carried by the reset link.
    pub fn token(&self) -> String {
        self.link
            .rsplit("token=")
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Mail dispatcher that records instead of sending.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    /// Everything sent so far.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Mail sent to `email`, most recent last.
    pub fn sent_to(&self, email: &str) -> Vec<SentMail> {
        self.sent()
            .into_iter()
            .filter(|m| m.to == email)
            .collect()
    }
}

#[async_trait]
impl MailDispatcher for RecordingMailer {
    async fn send_reset_link(&self, to: &str, reset_link: &str, locale: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            link: reset_link.to_string(),
            locale: locale.to_string(),
        });
        Ok(())
    }
}

/// Test application context
pub struct TestApp {
    /// Wired services
    pub state: AppState,
    /// Backing store for direct inspection
    pub db: MemoryDatabase,
    /// Clock driving every TTL
    pub clock: Arc<ManualClock>,
    /// Captured reset emails
    pub mailer: Arc<RecordingMailer>,
}

/// Configuration with a test key and cheap Argon2 parameters.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.password = PasswordConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        ..PasswordConfig::default()
    };
    config
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let db = MemoryDatabase::new();
        let clock = Arc::new(ManualClock::new(
            chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState::build(
            config,
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            mailer.clone(),
            clock.clone(),
        )
        .expect("Failed to build test application");

        Self {
            state,
            db,
            clock,
            mailer,
        }
    }

    /// Register a principal through the session service
    pub async fn create_test_user(&self, email: &str, password: &str) -> Principal {
        self.state
            .sessions
            .register(RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
                first_name: Some("Test".to_string()),
                last_name: None,
            })
            .await
            .expect("Failed to create test user")
    }

    /// Run the forgot-password flow to completion and return the token
    /// mailed to `email`, if any
    pub async fn request_reset(&self, email: &str, ip: &str) -> Option<String> {
        self.state
            .password_reset
            .forgot_password(email, ip, None)
            .await;
        self.state.password_reset.drain().await;
        self.mailer
            .sent_to(&email.trim().to_lowercase())
            .last()
            .map(SentMail::token)
    }
}
