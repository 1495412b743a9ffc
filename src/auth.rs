// ABOUTME: HS256 bearer token issuance and validation for dream journal users
// ABOUTME: Maps token failures onto detailed validation errors and AppError codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Bearer token authentication
//!
//! Tokens are HS256 JWTs signed with a shared secret. The `sub` claim is the opaque
//! owner id attached to every dream record. Token issuance is an operator task
//! (`somnia-cli token`); the server only validates.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            other => Self::auth_invalid(other.to_string()),
        }
    }
}

/// `JWT` claims carried by user tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Issues and validates user bearer tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a manager from the shared secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
        }
    }

    /// Configured token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a token for `user_id` with the configured lifetime
    pub fn generate_token(&self, user_id: &str) -> AppResult<String> {
        self.generate_token_with_ttl(user_id, Duration::hours(self.token_expiry_hours))
    }

    /// Generate a token with an explicit lifetime
    pub fn generate_token_with_ttl(&self, user_id: &str, ttl: Duration) -> AppResult<String> {
        if user_id.trim().is_empty() {
            return Err(AppError::invalid_input("Token subject must not be empty"));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_owned(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| self.convert_jwt_error(token, &e))
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(
        &self,
        token: &str,
        e: &jsonwebtoken::errors::Error,
    ) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::ExpiredSignature => {
                let expired_at = self.expiry_of(token).unwrap_or_else(Utc::now);
                JwtValidationError::TokenExpired { expired_at }
            }
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Read `exp` from a signature-checked token while ignoring expiry
    fn expiry_of(&self, token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .and_then(|data| DateTime::from_timestamp(data.claims.exp, 0))
    }
}
