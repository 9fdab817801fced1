//! Todo service
//!
//! Thin business-logic layer over the todo repository. Access control
//! (active-session check) happens at the HTTP layer; these operations
//! trust their caller.

use crate::error::ApiError;
use crate::repositories::{TodoRecord, TodoRepository, UpdateTodo};
use chrono::NaiveDate;
use sqlx::PgPool;
use taskpad_shared::types::{MessageResponse, TodoItem, TodoListResponse};
use taskpad_shared::validation::validate_title;

/// Todo service
pub struct TodoService;

impl TodoService {
    /// Create a task; title, description and due date are all required
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: &str,
        due_date: NaiveDate,
    ) -> Result<MessageResponse, ApiError> {
        validate_title(title).map_err(ApiError::Validation)?;
        if description.trim().is_empty() {
            return Err(ApiError::Validation("Description is required".to_string()));
        }

        TodoRepository::create(pool, title, description, due_date)
            .await
            .map_err(ApiError::Database)?;

        Ok(MessageResponse {
            message: "Task created successfully!".to_string(),
        })
    }

    /// List all tasks
    pub async fn list(pool: &PgPool) -> Result<TodoListResponse, ApiError> {
        let tasks = TodoRepository::list(pool)
            .await
            .map_err(ApiError::Database)?;

        let message = if tasks.is_empty() {
            "Empty table, no tasks found.".to_string()
        } else {
            "Tasks retrieved successfully!".to_string()
        };

        Ok(TodoListResponse {
            tasks: tasks.into_iter().map(to_item).collect(),
            message,
        })
    }

    /// Apply a partial update to a task
    pub async fn update(
        pool: &PgPool,
        task_id: i64,
        updates: UpdateTodo,
    ) -> Result<MessageResponse, ApiError> {
        if let Some(title) = &updates.title {
            validate_title(title).map_err(ApiError::Validation)?;
        }

        let updated = TodoRepository::update(pool, task_id, updates)
            .await
            .map_err(ApiError::Database)?;

        match updated {
            Some(_) => Ok(MessageResponse {
                message: "Task updated successfully!".to_string(),
            }),
            None => Err(ApiError::NotFound(format!(
                "Task not found with an ID of {}",
                task_id
            ))),
        }
    }

    /// Delete a task
    pub async fn delete(pool: &PgPool, task_id: i64) -> Result<MessageResponse, ApiError> {
        let deleted = TodoRepository::delete(pool, task_id)
            .await
            .map_err(ApiError::Database)?;

        if !deleted {
            return Err(ApiError::NotFound(format!(
                "Task not found with an ID of {}",
                task_id
            )));
        }

        Ok(MessageResponse {
            message: "Task deleted successfully!".to_string(),
        })
    }
}

fn to_item(record: TodoRecord) -> TodoItem {
    TodoItem {
        task_id: record.task_id,
        title: record.title,
        description: record.description,
        due_date: record.due_date,
        completed: record.completed,
        created_at: record.created_at,
    }
}
