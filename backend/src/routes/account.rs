//! Account routes
//!
//! Registration, login and logout. Handlers only marshal arguments;
//! the actual work runs on the bridge's worker pool.

use super::submit_and_wait;
use crate::auth::bearer_token;
use crate::error::{ApiError, ApiResult};
use crate::services::ops;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Response,
    routing::post,
    Json, Router,
};
use serde_json::json;
use taskpad_shared::types::{LoginRequest, RegisterRequest};

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Register a new user
///
/// POST /api/v1/account/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    submit_and_wait(
        &state,
        ops::REGISTER,
        vec![json!(req.username), json!(req.password)],
    )
    .await
}

/// Login with username and password
///
/// POST /api/v1/account/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    submit_and_wait(
        &state,
        ops::LOGIN,
        vec![json!(req.username), json!(req.password)],
    )
    .await
}

/// Logout the bearer token
///
/// POST /api/v1/account/logout
///
/// A missing or malformed Authorization header is a 401 before any task
/// is submitted. Verification of the token itself happens in the
/// worker, not here: an already-revoked token must reach the service to
/// produce its NOT_LOGGED_IN answer.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = bearer_token(auth_header)
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    submit_and_wait(&state, ops::LOGOUT, vec![json!(token)]).await
}
