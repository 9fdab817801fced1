//! Todo routes
//!
//! All todo endpoints require an active session: the `AuthUser`
//! extractor verifies the bearer token and checks its active marker in
//! the registry before the request reaches a handler.

use super::submit_and_wait;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ops;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use taskpad_shared::types::{CreateTodoRequest, UpdateTodoRequest};

/// Create todo routes
pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:task_id", patch(update_task).delete(delete_task))
}

/// Create a task
///
/// POST /api/v1/todos
async fn create_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<Response> {
    submit_and_wait(
        &state,
        ops::TODO_CREATE,
        vec![json!(req.title), json!(req.description), json!(req.due_date)],
    )
    .await
}

/// List all tasks
///
/// GET /api/v1/todos
async fn list_tasks(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Response> {
    submit_and_wait(&state, ops::TODO_LIST, vec![]).await
}

/// Partially update a task
///
/// PATCH /api/v1/todos/:task_id
async fn update_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Response> {
    submit_and_wait(
        &state,
        ops::TODO_UPDATE,
        vec![
            json!(task_id),
            json!(req.title),
            json!(req.description),
            json!(req.due_date),
            json!(req.completed),
        ],
    )
    .await
}

/// Delete a task
///
/// DELETE /api/v1/todos/:task_id
async fn delete_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(task_id): Path<i64>,
) -> ApiResult<Response> {
    submit_and_wait(&state, ops::TODO_DELETE, vec![json!(task_id)]).await
}
