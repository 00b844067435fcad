//! In-memory implementation of both repositories behind a single lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::NormalizedEmail;
use warden_entity::{ConsumeOutcome, NewPrincipal, Principal, ResetToken};

use crate::repositories::{PrincipalRepository, ResetTokenRepository};

#[derive(Debug, Default)]
struct InnerState {
    principals: HashMap<Uuid, Principal>,
    /// Canonical email -> principal id.
    emails: HashMap<String, Uuid>,
    tokens: HashMap<String, ResetToken>,
}

/// Principals and reset tokens held in process memory.
///
/// Suitable for single-node deployments only. Token consumption and the
/// password update happen under one write lock, which gives the same
/// all-or-nothing behaviour as the PostgreSQL transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<InnerState>>,
}

impl MemoryDatabase {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reset tokens, in any state.
    pub async fn token_count(&self) -> usize {
        self.state.read().await.tokens.len()
    }
}

#[async_trait]
impl PrincipalRepository for MemoryDatabase {
    async fn find_by_email(&self, email: &NormalizedEmail) -> AppResult<Option<Principal>> {
        let state = self.state.read().await;
        Ok(state
            .emails
            .get(email.as_str())
            .and_then(|id| state.principals.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        Ok(self.state.read().await.principals.get(&id).cloned())
    }

    async fn exists_by_email(&self, email: &NormalizedEmail) -> AppResult<bool> {
        Ok(self.state.read().await.emails.contains_key(email.as_str()))
    }

    async fn create(&self, data: NewPrincipal, now: DateTime<Utc>) -> AppResult<Principal> {
        let mut state = self.state.write().await;
        if state.emails.contains_key(data.email.as_str()) {
            return Err(AppError::conflict("Email already in use"));
        }

        let principal = data.into_principal(now);
        state.emails.insert(principal.email.clone(), principal.id);
        state.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }
}

#[async_trait]
impl ResetTokenRepository for MemoryDatabase {
    async fn insert(&self, token: &ResetToken) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.tokens.contains_key(&token.token) {
            return Err(AppError::conflict("Reset token collision"));
        }
        state.tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ResetToken>> {
        Ok(self.state.read().await.tokens.get(token).cloned())
    }

    async fn consume(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ConsumeOutcome> {
        let mut state = self.state.write().await;
        let InnerState {
            principals, tokens, ..
        } = &mut *state;

        let Some(record) = tokens.get_mut(token) else {
            return Ok(ConsumeOutcome::NotFound);
        };
        if record.is_used() {
            return Ok(ConsumeOutcome::AlreadyUsed);
        }
        if record.is_expired_at(now) {
            return Ok(ConsumeOutcome::Expired);
        }

        let principal_id = record.principal_id;
        let principal = principals.get_mut(&principal_id).ok_or_else(|| {
            AppError::not_found(format!("Principal {principal_id} for reset token not found"))
        })?;

        principal.password_hash = password_hash.to_string();
        principal.updated_at = now;
        record.used_at = Some(now);

        Ok(ConsumeOutcome::Consumed { principal_id })
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state.tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - state.tokens.len()) as u64)
    }

    async fn delete_used_before(&self, threshold: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|_, t| !matches!(t.used_at, Some(used) if used < threshold));
        Ok((before - state.tokens.len()) as u64)
    }
}
