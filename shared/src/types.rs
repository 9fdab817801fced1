//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session token response returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Generic message response (register, logout, todo mutations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A todo item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub task_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to create a todo item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
}

/// Partial update of a todo item
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: Option<bool>,
}

/// Todo list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub tasks: Vec<TodoItem>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_roundtrip() {
        let json = r#"{"username":"alice","password":"s3cret"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.password, "s3cret");
    }

    #[test]
    fn test_update_todo_request_all_fields_optional() {
        let req: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.completed.is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let resp = ErrorResponse {
            error: ErrorDetail {
                code: "NOT_LOGGED_IN".to_string(),
                message: "Token not found".to_string(),
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"]["code"], "NOT_LOGGED_IN");
    }
}
