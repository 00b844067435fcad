//! Principal persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::NormalizedEmail;
use warden_entity::{NewPrincipal, Principal};

/// Lookup and mutation of principals.
///
/// Emails passed in are already canonical, so implementations compare them
/// byte-for-byte.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + std::fmt::Debug {
    /// Find a principal by canonical email.
    async fn find_by_email(&self, email: &NormalizedEmail) -> AppResult<Option<Principal>>;

    /// Find a principal by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>>;

    /// Whether a principal with this email exists.
    async fn exists_by_email(&self, email: &NormalizedEmail) -> AppResult<bool>;

    /// Insert a new principal. Fails with `Conflict` when the email is taken.
    async fn create(&self, data: NewPrincipal, now: DateTime<Utc>) -> AppResult<Principal>;
}

/// PostgreSQL-backed [`PrincipalRepository`].
#[derive(Debug, Clone)]
pub struct PgPrincipalRepository {
    pool: PgPool,
}

impl PgPrincipalRepository {
    /// Create a new principal repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalRepository for PgPrincipalRepository {
    async fn find_by_email(&self, email: &NormalizedEmail) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find principal by email", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find principal by id", e)
            })
    }

    async fn exists_by_email(&self, email: &NormalizedEmail) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM principals WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check principal email", e)
            })
    }

    async fn create(&self, data: NewPrincipal, now: DateTime<Utc>) -> AppResult<Principal> {
        let row = data.into_principal(now);
        sqlx::query_as::<_, Principal>(
            "INSERT INTO principals \
                (id, email, password_hash, first_name, last_name, roles, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(row.id)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.roles)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("principals_email_key") =>
            {
                AppError::conflict("Email already in use")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create principal", e),
        })
    }
}
