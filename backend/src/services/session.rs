//! Session service: register, login, logout
//!
//! The only component with credential business logic. Per token the
//! lifecycle is ANONYMOUS -> ACTIVE (login) -> REVOKED (logout or
//! expiry); any token that fails verification or lookup is ANONYMOUS.
//!
//! # Performance
//!
//! Password hashing/verification runs on the blocking thread pool;
//! token signing uses pre-computed keys.

use crate::auth::revocation::ActiveSessionStore;
use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{CredentialRepository, CredentialStoreError};
use sqlx::PgPool;
use taskpad_shared::types::{MessageResponse, TokenResponse};
use taskpad_shared::validation::{validate_password, validate_username};
use tracing::info;

/// Session service for authentication operations
pub struct SessionService;

impl SessionService {
    /// Register a new user
    pub async fn register(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        validate_username(username).map_err(ApiError::Validation)?;
        validate_password(password).map_err(ApiError::Validation)?;

        // Hash on the blocking pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        // The unique constraint arbitrates concurrent registrations of
        // the same name; no read-then-write check
        let credential = CredentialRepository::create(pool, username, &password_hash)
            .await
            .map_err(|err| match err {
                CredentialStoreError::DuplicateUsername => ApiError::DuplicateUsername,
                CredentialStoreError::Database(err) => ApiError::Database(err),
            })?;

        info!(user_id = credential.user_id, "user registered");
        Ok(MessageResponse {
            message: "User registered successfully!".to_string(),
        })
    }

    /// Login with username and password
    ///
    /// Unknown user and wrong password produce the same generic error;
    /// responses never reveal whether a username exists.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        sessions: &dyn ActiveSessionStore,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        validate_username(username).map_err(ApiError::Validation)?;
        validate_password(password).map_err(ApiError::Validation)?;

        let credential = CredentialRepository::find_by_username(pool, username)
            .await
            .map_err(ApiError::Database)?
            .ok_or(ApiError::InvalidCredentials)?;

        // Verify on the blocking pool (CPU-intensive)
        let valid =
            PasswordService::verify_async(password.to_string(), credential.password_hash.clone())
                .await
                .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::InvalidCredentials);
        }

        let (token, claims) = tokens
            .issue(credential.user_id)
            .map_err(ApiError::Internal)?;

        // Active marker makes the token revocable; its TTL matches the
        // token's remaining lifetime so the entry can never outlive it
        sessions
            .register_active(&token, credential.user_id, claims.remaining_secs())
            .await?;

        info!(user_id = credential.user_id, "user logged in");
        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.ttl_secs(),
        })
    }

    /// Logout: verify the token, then remove its active marker
    ///
    /// Expired and malformed tokens are rejected before the registry is
    /// consulted; a verified token with no active marker (already
    /// logged out, or never issued through this service) is
    /// `NotLoggedIn`.
    pub async fn logout(
        tokens: &TokenService,
        sessions: &dyn ActiveSessionStore,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        let claims = tokens.verify(token)?;

        sessions.revoke(token).await?;

        info!(jti = %claims.jti, "user logged out");
        Ok(MessageResponse {
            message: "User logged out successfully!".to_string(),
        })
    }
}
