//! Input validation functions
//!
//! This module provides validation utilities for user input.

/// Validate a username
///
/// Usernames must be non-empty (after trimming) and fit the database
/// column (255 chars).
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }
    if username.len() > 255 {
        return Err("Username too long".to_string());
    }
    Ok(())
}

/// Validate a password
///
/// Passwords must be non-empty. No composition rules beyond that; the
/// hash layer does not care.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a todo title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if title.len() > 100 {
        return Err("Title must be at most 100 characters".to_string());
    }
    Ok(())
}
