//! Integration tests for the todo CRUD flow
//!
//! Requires live Postgres and Redis; run with:
//! `cargo test -- --ignored`

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

async fn login(app: &common::TestApp) -> String {
    let user = format!("todo-user-{}", Uuid::new_v4());
    let creds = json!({ "username": user, "password": "pw" }).to_string();

    let (status, _) = app.post("/api/v1/account/register", &creds, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/v1/account/login", &creds, None).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_todo_crud_lifecycle() {
    let app = common::TestApp::new().await;
    app.cleanup().await;
    let token = login(&app).await;

    // Create
    let body = json!({
        "title": "Buy milk",
        "description": "Two liters",
        "due_date": "2026-09-15"
    })
    .to_string();
    let (status, resp) = app.post("/api/v1/todos", &body, Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(resp["message"].as_str().unwrap().contains("created"));

    // List
    let (status, resp) = app.get("/api/v1/todos", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = resp["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["completed"], false);
    let task_id = tasks[0]["task_id"].as_i64().unwrap();

    // Partial update
    let patch = json!({ "completed": true }).to_string();
    let (status, _) = app
        .patch(&format!("/api/v1/todos/{}", task_id), &patch, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, resp) = app.get("/api/v1/todos", Some(&token)).await;
    assert_eq!(resp["tasks"][0]["completed"], true);
    // Untouched fields survive a partial update
    assert_eq!(resp["tasks"][0]["title"], "Buy milk");

    // Delete
    let (status, _) = app
        .delete(&format!("/api/v1/todos/{}", task_id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, resp) = app.get("/api/v1/todos", Some(&token)).await;
    assert!(resp["tasks"].as_array().unwrap().is_empty());
    assert!(resp["message"].as_str().unwrap().contains("no tasks"));

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_update_missing_task_is_404() {
    let app = common::TestApp::new().await;
    let token = login(&app).await;

    let patch = json!({ "completed": true }).to_string();
    let (status, body) = app
        .patch("/api/v1/todos/999999", &patch, Some(&token))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_create_requires_all_fields() {
    let app = common::TestApp::new().await;
    let token = login(&app).await;

    let body = json!({
        "title": "No description",
        "description": "",
        "due_date": "2026-09-15"
    })
    .to_string();
    let (status, resp) = app.post("/api/v1/todos", &body, Some(&token)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"]["code"], "VALIDATION_ERROR");

    app.cleanup().await;
}
