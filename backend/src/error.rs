//! Application error handling
//!
//! This module provides the unified error taxonomy for the API,
//! converting internal errors to appropriate HTTP responses. The same
//! mapping is reused by the task dispatcher to build worker results, so
//! an error renders identically whether it surfaces through an HTTP
//! handler or through the task bridge.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use taskpad_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

use crate::auth::revocation::SessionStoreError;
use crate::auth::token::TokenError;
use crate::bridge::BridgeError;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenMalformed,

    #[error("Token not found. Must login first")]
    NotLoggedIn,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Task timed out")]
    Timeout,

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUsername => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::TokenExpired
            | ApiError::TokenMalformed
            | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotLoggedIn | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Worker(_) | ApiError::Internal(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::DuplicateUsername => "DUPLICATE_USERNAME",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::TokenMalformed => "TOKEN_MALFORMED",
            ApiError::NotLoggedIn => "NOT_LOGGED_IN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Timeout => "TASK_TIMEOUT",
            ApiError::Worker(_) => "WORKER_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Client-facing message
    ///
    /// Internal/store errors are logged here and rendered as a generic
    /// message; driver text is never exposed to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                "An internal error occurred".to_string()
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                "A database error occurred".to_string()
            }
            ApiError::Worker(detail) => {
                error!("Worker error: {}", detail);
                "Task execution failed".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Serialize to the wire error body
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.kind().to_string(),
                message: self.public_message(),
            },
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Malformed => ApiError::TokenMalformed,
        }
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotLoggedIn => ApiError::NotLoggedIn,
            SessionStoreError::Backend(detail) => {
                ApiError::Internal(anyhow::anyhow!("session store: {}", detail))
            }
        }
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Timeout => ApiError::Timeout,
            BridgeError::Worker(detail) => ApiError::Worker(detail),
            BridgeError::QueueClosed => ApiError::Worker("task queue closed".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(self.to_body());
        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
