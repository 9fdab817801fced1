//! Authentication middleware
//!
//! Provides the Axum extractor guarding protected routes. A request is
//! authenticated only if it carries a bearer token whose signature and
//! expiry check out *and* whose active marker is still present in the
//! session registry; a logged-out token fails here even though its
//! signature is still valid.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Authenticated user extracted from a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Pull the bearer token out of an Authorization header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = bearer_token(auth_header)
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

        // Signature + expiry (pre-computed keys, no allocation)
        let claims = app_state.tokens().verify(token)?;

        // Logged-out or never-issued tokens are rejected even when the
        // signature is valid
        if !app_state.sessions().is_active(token).await? {
            return Err(ApiError::Unauthorized(
                "Invalid or expired session".to_string(),
            ));
        }

        let user_id = claims.user_id().map_err(ApiError::from)?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn test_auth_user_debug() {
        let user = AuthUser { user_id: 7 };
        let debug_str = format!("{:?}", user);
        assert!(debug_str.contains("AuthUser"));
    }
}
