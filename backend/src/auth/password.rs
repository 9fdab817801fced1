//! Password hashing using bcrypt
//!
//! Provides secure password hashing and verification. The salt is
//! embedded in the bcrypt blob, so verification needs no side lookup.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. The async wrappers run the
//! work on `spawn_blocking` so it never stalls the async runtime.

use anyhow::Result;
use bcrypt::DEFAULT_COST;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// The raw password is never logged or returned.
    pub fn hash(password: &str) -> Result<String> {
        bcrypt::hash(password, DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `false` rather than an error for malformed blobs, so a
    /// corrupt row behaves exactly like a wrong password.
    pub fn verify(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "s3cret";
        let hash = PasswordService::hash(password).unwrap();

        assert!(PasswordService::verify(password, &hash));
        assert!(!PasswordService::verify("wrong_password", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = PasswordService::hash(password).unwrap();
        let hash2 = PasswordService::hash(password).unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(PasswordService::verify(password, &hash1));
        assert!(PasswordService::verify(password, &hash2));
    }

    #[test]
    fn test_malformed_blob_verifies_false() {
        assert!(!PasswordService::verify("anything", "not-a-bcrypt-blob"));
        assert!(!PasswordService::verify("anything", ""));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = PasswordService::hash_async(password.clone()).await.unwrap();

        assert!(PasswordService::verify_async(password, hash.clone())
            .await
            .unwrap());
        assert!(!PasswordService::verify_async("wrong".to_string(), hash)
            .await
            .unwrap());
    }
}
