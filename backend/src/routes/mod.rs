//! Route definitions for the Taskpad API
//!
//! This module organizes all API routes and applies middleware. Every
//! business route is a thin synchronous facade: submit the operation to
//! the task bridge, block on the result (with a timeout), relay the
//! worker's (payload, status) pair onto the wire.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod account;
mod health;
mod todos;

#[cfg(test)]
mod account_tests;

pub use account::account_routes;
pub use todos::todo_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Taskpad API v1" }))
        .nest("/account", account::account_routes())
        .nest("/todos", todos::todo_routes())
}

/// Submit an operation and block until its result, relaying the
/// worker's (payload, status) pair as the HTTP response
pub(crate) async fn submit_and_wait(
    state: &AppState,
    op: &str,
    args: Vec<Value>,
) -> ApiResult<Response> {
    let handle = state.bridge.submit(op, args).await?;
    let result = state
        .bridge
        .await_result(handle, state.config.bridge.await_timeout())
        .await?;

    let status =
        StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok((status, Json(result.payload)).into_response())
}
