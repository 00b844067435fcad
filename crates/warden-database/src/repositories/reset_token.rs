//! Password-reset token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_entity::{ConsumeOutcome, ResetToken};

/// Storage for reset tokens.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync + std::fmt::Debug {
    /// Persist a freshly issued token.
    async fn insert(&self, token: &ResetToken) -> AppResult<()>;

    /// Fetch a token by value regardless of its state.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ResetToken>>;

    /// Atomically spend `token` and set the owning principal's password
    /// hash to `password_hash`.
    ///
    /// Of any number of concurrent calls for the same token at most one
    /// returns [`ConsumeOutcome::Consumed`]. When the outcome is anything
    /// else, the password is left unchanged.
    async fn consume(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ConsumeOutcome>;

    /// Delete tokens whose expiry is strictly before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete used tokens consumed strictly before `threshold`.
    async fn delete_used_before(&self, threshold: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed [`ResetTokenRepository`].
#[derive(Debug, Clone)]
pub struct PgResetTokenRepository {
    pool: PgPool,
}

impl PgResetTokenRepository {
    /// Create a new reset-token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenRepository for PgResetTokenRepository {
    async fn insert(&self, token: &ResetToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens \
                (id, token, principal_id, expires_at, used_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.principal_id)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Reset token collision")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to store reset token", e),
        })?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ResetToken>> {
        sqlx::query_as::<_, ResetToken>("SELECT * FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find reset token", e)
            })
    }

    async fn consume(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ConsumeOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // The conditional update is the single point of mutual exclusion:
        // concurrent callers serialize on the row lock and only one sees a
        // row come back.
        let claimed: Option<Uuid> = sqlx::query_scalar(
            "UPDATE password_reset_tokens SET used_at = $2 \
             WHERE token = $1 AND used_at IS NULL AND expires_at > $2 \
             RETURNING principal_id",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim reset token", e))?;

        let Some(principal_id) = claimed else {
            let state: Option<(Option<DateTime<Utc>>, DateTime<Utc>)> = sqlx::query_as(
                "SELECT used_at, expires_at FROM password_reset_tokens WHERE token = $1",
            )
            .bind(token)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect reset token", e)
            })?;

            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            })?;

            return Ok(match state {
                None => ConsumeOutcome::NotFound,
                Some((Some(_), _)) => ConsumeOutcome::AlreadyUsed,
                Some((None, _)) => ConsumeOutcome::Expired,
            });
        };

        let updated = sqlx::query(
            "UPDATE principals SET password_hash = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(principal_id)
        .bind(password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls the claim back.
            return Err(AppError::not_found(format!(
                "Principal {principal_id} for reset token not found"
            )));
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit password reset", e)
        })?;

        Ok(ConsumeOutcome::Consumed { principal_id })
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_used_before(&self, threshold: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM password_reset_tokens WHERE used_at IS NOT NULL AND used_at < $1",
        )
        .bind(threshold)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete used tokens", e)
        })?;
        Ok(result.rows_affected())
    }
}
