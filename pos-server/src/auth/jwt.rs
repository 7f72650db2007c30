//! JWT token service
//!
//! Issues and validates HS256 tokens carrying the staff identity and its
//! tenant/branch scope.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{Role, Staff};
use thiserror::Error;

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    pub tenant_id: i64,
    /// `None` only for owners
    pub branch_id: Option<i64>,
    pub role: Role,
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("token expired")]
    ExpiredToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Signing keys plus token lifetime
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.expiry_hours * 3600
    }

    /// Issue a token for a staff account
    pub fn issue(&self, user: &Staff) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            tenant_id: user.tenant_id,
            branch_id: user.branch_id,
            role: user.role,
            email: user.email.clone(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Strip the `Bearer ` prefix from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(role: Role, branch_id: Option<i64>) -> Staff {
        Staff {
            id: 42,
            tenant_id: 7,
            branch_id,
            email: "cashier@example.com".into(),
            full_name: "Casey".into(),
            role,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let svc = JwtService::new("test-secret", 12);
        let token = svc.issue(&staff(Role::Cashier, Some(3))).unwrap();

        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.tenant_id, 7);
        assert_eq!(claims.branch_id, Some(3));
        assert_eq!(claims.role, Role::Cashier);
        assert_eq!(svc.expires_in(), 12 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtService::new("secret-a", 1)
            .issue(&staff(Role::Owner, None))
            .unwrap();
        let err = JwtService::new("secret-b", 1).validate(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token() {
        let svc = JwtService::new("test-secret", -2);
        let token = svc.issue(&staff(Role::Manager, Some(1))).unwrap();
        assert!(matches!(svc.validate(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
