//! JWT access tokens (HS256).
//!
//! Tokens carry the user id as `sub` plus the email, and are validated for
//! signature, expiry, not-before and issuer.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ISSUER: &str = "postcraft";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    Create(String),

    #[error("Failed to validate token: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::Create(format!("Token encoding failed: {e}")))
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    #[test]
    fn test_create_and_validate() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ana@example.com", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.email, "ana@example.com");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "ana@example.com", Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret-entirely-different"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Beyond the default 60s leeway
        let claims = Claims::new(Uuid::new_v4(), "ana@example.com", Duration::hours(-2));
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "ana@example.com", Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(validate_token("not.a.jwt", SECRET).is_err());
    }
}
