//! Credential repository: username to password-hash mappings
//!
//! The uniqueness of usernames is enforced by the database constraint,
//! not by a prior lookup; two concurrent registrations of the same name
//! race at the INSERT and exactly one wins.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

/// Credential row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Credential store failures
#[derive(Error, Debug)]
pub enum CredentialStoreError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Credential repository for database operations
pub struct CredentialRepository;

impl CredentialRepository {
    /// Insert a new credential, relying on the unique constraint
    pub async fn create(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<CredentialRecord, CredentialStoreError> {
        sqlx::query_as::<_, CredentialRecord>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING user_id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|err| match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                CredentialStoreError::DuplicateUsername
            }
            _ => CredentialStoreError::Database(err),
        })
    }

    /// Find a credential by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<CredentialRecord>, sqlx::Error> {
        let credential = sqlx::query_as::<_, CredentialRecord>(
            r#"
            SELECT user_id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(credential)
    }
}
