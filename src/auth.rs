// ABOUTME: JWT-based user authentication and password management
// ABOUTME: Handles token generation, validation, and bcrypt password hashing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! # Authentication
//!
//! JWT-based authentication for the Potluck server. The [`AuthManager`]
//! issues and validates HS256 tokens; password hashing goes through bcrypt
//! on a blocking thread so request workers are never stalled.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let duration_expired = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    duration_expired.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(err: JwtValidationError) -> Self {
        match &err {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { reason } => Self::auth_invalid(reason.clone()),
            JwtValidationError::TokenMalformed { details } => Self::auth_malformed(details.clone()),
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authentication result with user context
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
}

/// Authentication manager for `JWT` tokens
#[derive(Clone)]
pub struct AuthManager {
    jwt_secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub const fn new(jwt_secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_expiry_hours,
        }
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
    }

    /// Validate a `JWT` token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why validation failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        // Expiry is checked manually below so the error can carry timestamps
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &validation,
        )
        .map_err(|e| Self::convert_jwt_error(&e))?;

        let claims = token_data.claims;
        let current_time = Utc::now();
        if current_time.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(current_time);
            tracing::warn!(
                user.id = %claims.sub,
                expired_at = %expired_at.to_rfc3339(),
                "JWT token expired"
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }

        Ok(claims)
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns an error if the header is missing, not a Bearer token, or
    /// the token fails validation
    pub fn authenticate(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::auth_malformed("Authorization header must use the Bearer scheme")
        })?;

        let claims = self.validate_token(token).map_err(AppError::from)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::auth_invalid(format!("Invalid user id in token: {e}")))?;

        Ok(AuthResult { user_id })
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                JwtValidationError::TokenMalformed {
                    details: "Token format is invalid".into(),
                }
            }
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}

/// Generate a cryptographically secure JWT secret
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    use rand::RngCore;

    let mut secret = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut secret);
    secret
}

/// Hash a password with bcrypt on a blocking thread
///
/// # Errors
///
/// Returns an error if hashing fails or the blocking task is cancelled
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a bcrypt hash on a blocking thread
///
/// # Errors
///
/// Returns an error if verification fails or the blocking task is cancelled
pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "cook@example.com".into(),
            "cook".into(),
            "Test".into(),
            "Cook".into(),
            "hash".into(),
        )
    }

    #[test]
    fn test_token_round_trip() {
        let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);
        let other = AuthManager::new(generate_jwt_secret().to_vec(), 24);
        let token = manager.generate_token(&test_user()).unwrap();

        assert!(matches!(
            other.validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = AuthManager::new(generate_jwt_secret().to_vec(), -1);
        let token = manager.generate_token(&test_user()).unwrap();

        assert!(matches!(
            manager.validate_token(&token),
            Err(JwtValidationError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_authenticate_requires_bearer_scheme() {
        let manager = AuthManager::new(generate_jwt_secret().to_vec(), 24);
        let user = test_user();
        let token = manager.generate_token(&user).unwrap();

        let result = manager.authenticate(Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(result.user_id, user.id);

        assert!(manager.authenticate(Some(&token)).is_err());
        assert!(manager.authenticate(None).is_err());
    }
}
