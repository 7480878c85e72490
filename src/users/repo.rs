use async_trait::async_trait;
use sqlx::{error::ErrorKind, PgPool};
use thiserror::Error;

use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum RepoError {
    /// Insert hit the unique constraint on `username` or `email`.
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("unknown"))]
    Conflict { constraint: Option<String> },
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        let conflict = match &e {
            sqlx::Error::Database(db_err) => conflict_for(db_err.kind(), db_err.constraint()),
            _ => None,
        };
        conflict.unwrap_or(RepoError::Database(e))
    }
}

/// Only unique violations are conflicts; other constraint failures are bugs.
fn conflict_for(kind: ErrorKind, constraint: Option<&str>) -> Option<RepoError> {
    match kind {
        ErrorKind::UniqueViolation => Some(RepoError::Conflict {
            constraint: constraint.map(str::to_owned),
        }),
        _ => None,
    }
}

/// Persistence for users. Handlers only see this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<i64, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<i64, RepoError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, created_at, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, created_at, is_active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, created_at, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
