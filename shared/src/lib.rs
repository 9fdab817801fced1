//! Taskpad Shared Library
//!
//! This crate contains the wire types and input validation helpers used
//! by the backend and by integration tests.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
