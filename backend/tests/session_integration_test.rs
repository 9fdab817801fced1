//! Integration tests for the account session flow
//!
//! Requires live Postgres and Redis; run with:
//! `cargo test -- --ignored`

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn unique(name: &str) -> String {
    format!("{}-{}", name, Uuid::new_v4())
}

fn creds(username: &str, password: &str) -> String {
    json!({ "username": username, "password": password }).to_string()
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_register_login_logout_scenario() {
    let app = common::TestApp::new().await;
    let alice = unique("alice");

    // register -> 201
    let (status, body) = app
        .post("/api/v1/account/register", &creds(&alice, "s3cret"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].as_str().unwrap().contains("registered"));

    // login -> 200 + token
    let (status, body) = app
        .post("/api/v1/account/login", &creds(&alice, "s3cret"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    // logout -> 200
    let (status, body) = app
        .post("/api/v1/account/logout", "", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("logged out"));

    // logout again with the same token -> NOT_LOGGED_IN
    let (status, body) = app
        .post("/api/v1/account/logout", "", Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_LOGGED_IN");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = common::TestApp::new().await;
    let alice = unique("alice");

    let (status, _) = app
        .post("/api/v1/account/register", &creds(&alice, "s3cret"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Wrong password
    let (status, wrong_pw) = app
        .post("/api/v1/account/login", &creds(&alice, "wrong"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown user
    let (status, unknown) = app
        .post(
            "/api/v1/account/login",
            &creds(&unique("nobody"), "wrong"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Same kind, same message: no username enumeration
    assert_eq!(wrong_pw["error"], unknown["error"]);
    assert_eq!(wrong_pw["error"]["code"], "INVALID_CREDENTIALS");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_duplicate_registration_second_attempt_conflicts() {
    let app = common::TestApp::new().await;
    let bob = unique("bob");

    let (status, _) = app
        .post("/api/v1/account/register", &creds(&bob, "pw1"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/api/v1/account/register", &creds(&bob, "pw2"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_USERNAME");

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_concurrent_registrations_exactly_one_wins() {
    let app = std::sync::Arc::new(common::TestApp::new().await);
    let carol = unique("carol");

    // N parallel registrations of the same username: the unique
    // constraint must let exactly one through
    let mut attempts = Vec::new();
    for _ in 0..8 {
        let app = std::sync::Arc::clone(&app);
        let carol = carol.clone();
        attempts.push(tokio::spawn(async move {
            let (status, _) = app
                .post("/api/v1/account/register", &creds(&carol, "pw"), None)
                .await;
            status
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_revoked_marker_absent_from_registry() {
    let app = common::TestApp::new().await;
    let dave = unique("dave");

    app.post("/api/v1/account/register", &creds(&dave, "pw"), None)
        .await;
    let (_, body) = app
        .post("/api/v1/account/login", &creds(&dave, "pw"), None)
        .await;
    let token = body["token"].as_str().unwrap().to_string();

    // Active marker present after login
    assert!(app.state.sessions().is_active(&token).await.unwrap());

    // Gone immediately after logout, well before natural expiry
    app.post("/api/v1/account/logout", "", Some(&token)).await;
    assert!(!app.state.sessions().is_active(&token).await.unwrap());

    app.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database and redis"]
async fn test_logged_out_token_cannot_access_todos() {
    let app = common::TestApp::new().await;
    let erin = unique("erin");

    app.post("/api/v1/account/register", &creds(&erin, "pw"), None)
        .await;
    let (_, body) = app
        .post("/api/v1/account/login", &creds(&erin, "pw"), None)
        .await;
    let token = body["token"].as_str().unwrap().to_string();

    // Works while the session is active
    let (status, _) = app.get("/api/v1/todos", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    app.post("/api/v1/account/logout", "", Some(&token)).await;

    // Same signed token is rejected once revoked
    let (status, _) = app.get("/api/v1/todos", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.cleanup().await;
}
