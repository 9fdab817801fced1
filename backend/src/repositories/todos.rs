//! Todo repository for database operations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

/// Todo row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoRecord {
    pub task_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a todo row
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: Option<bool>,
}

/// Todo repository for database operations
pub struct TodoRepository;

impl TodoRepository {
    /// Insert a new task
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: &str,
        due_date: NaiveDate,
    ) -> Result<TodoRecord, sqlx::Error> {
        let task = sqlx::query_as::<_, TodoRecord>(
            r#"
            INSERT INTO tasks (title, description, due_date)
            VALUES ($1, $2, $3)
            RETURNING task_id, title, description, due_date, completed, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// List all tasks, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<TodoRecord>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TodoRecord>(
            r#"
            SELECT task_id, title, description, due_date, completed, created_at
            FROM tasks
            ORDER BY task_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Apply a partial update; returns None when the task does not exist
    pub async fn update(
        pool: &PgPool,
        task_id: i64,
        updates: UpdateTodo,
    ) -> Result<Option<TodoRecord>, sqlx::Error> {
        let task = sqlx::query_as::<_, TodoRecord>(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                completed = COALESCE($5, completed)
            WHERE task_id = $1
            RETURNING task_id, title, description, due_date, completed, created_at
            "#,
        )
        .bind(task_id)
        .bind(updates.title)
        .bind(updates.description)
        .bind(updates.due_date)
        .bind(updates.completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Delete a task; returns false when it does not exist
    pub async fn delete(pool: &PgPool, task_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require a database - see tests/todos_integration_test.rs
}
