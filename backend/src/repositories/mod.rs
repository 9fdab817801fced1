//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod credentials;
pub mod todos;

pub use credentials::{CredentialRecord, CredentialRepository, CredentialStoreError};
pub use todos::{TodoRecord, TodoRepository, UpdateTodo};
