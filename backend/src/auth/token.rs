//! Session token issuance and verification
//!
//! Tokens are self-contained HS256 JWTs carrying the user id, issue and
//! expiry timestamps, and a random `jti`. The signing secret is 256
//! random bits generated once at startup and held only in memory, so a
//! process restart invalidates every previously issued token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token ID, unique per issuance; keys the revocation registry
    pub jti: String,
}

impl Claims {
    /// Seconds until expiry, clamped at zero
    pub fn remaining_secs(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

/// Token verification failures
///
/// A structurally broken token and a bad signature are deliberately
/// indistinguishable; only an otherwise-valid token past its expiry is
/// reported separately.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Malformed,
}

/// Generate a fresh 256-bit signing secret
pub fn generate_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Session token service with pre-computed keys
///
/// Keys are expensive to derive, so they are built once and wrapped in
/// `Arc` for cheap cloning into worker tasks.
#[derive(Clone)]
pub struct TokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service with a startup-generated secret
    ///
    /// Call once at application startup and store in AppState.
    pub fn new(ttl_secs: i64) -> Self {
        Self::with_secret(&generate_secret(), ttl_secs)
    }

    /// Create a token service from an explicit secret (tests)
    pub fn with_secret(secret: &[u8], ttl_secs: i64) -> Self {
        // Zero leeway: a token expired by one second is expired
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            validation,
            ttl_secs,
        }
    }

    /// Issue a signed token for a user, valid for the configured TTL
    pub fn issue(&self, user_id: i64) -> anyhow::Result<(String, Claims)> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;

        Ok((token, claims))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }

    /// Configured token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> TokenService {
        TokenService::with_secret(b"test-secret-test-secret-test-sec", 3600)
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_test_service();

        let (token, issued) = service.issue(42).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.jti, issued.jti);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_jti_unique_per_issuance() {
        let service = create_test_service();
        let (_, a) = service.issue(1).unwrap();
        let (_, b) = service.issue(1).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_reported_as_expired() {
        // Negative TTL puts exp in the past at issuance
        let service = TokenService::with_secret(b"test-secret-test-secret-test-sec", -10);
        let (token, _) = service.issue(42).unwrap();

        let verifier = create_test_service();
        assert_eq!(verifier.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_reported_as_malformed() {
        let service = create_test_service();
        assert_eq!(
            service.verify("not.a.token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_secret_reported_as_malformed() {
        // Signature failure must be indistinguishable from a parse failure
        let issuer = TokenService::with_secret(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", 3600);
        let verifier = TokenService::with_secret(b"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", 3600);

        let (token, _) = issuer.issue(7).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_startup_secrets_differ_across_services() {
        // Two services with generated secrets reject each other's tokens
        let a = TokenService::new(3600);
        let b = TokenService::new(3600);

        let (token, _) = a.issue(1).unwrap();
        assert!(a.verify(&token).is_ok());
        assert_eq!(b.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_remaining_secs_clamped() {
        let claims = Claims {
            sub: "1".to_string(),
            exp: Utc::now().timestamp() - 100,
            iat: Utc::now().timestamp() - 200,
            jti: "x".to_string(),
        };
        assert_eq!(claims.remaining_secs(), 0);
    }

    #[test]
    fn test_generated_secrets_are_distinct() {
        assert_ne!(generate_secret(), generate_secret());
    }
}
