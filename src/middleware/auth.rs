// ABOUTME: Bearer token authentication for dream routes
// ABOUTME: Resolves the Authorization header to the owner id carried in the token subject
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::auth::AuthManager;
use crate::errors::{AppError, AppResult};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Identity resolved from a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Token subject; owner id of dream records
    pub user_id: String,
}

/// Authenticate a request from its headers
///
/// # Errors
///
/// - `AUTH_REQUIRED` when no `Authorization` header is present
/// - `AUTH_INVALID` for a non-bearer scheme or a token that fails validation
/// - `AUTH_EXPIRED` for an expired token
///
/// On success the subject is recorded as `user_id` on the enclosing request span.
pub fn authenticate_request(
    headers: &HeaderMap,
    auth_manager: &AuthManager,
) -> AppResult<AuthenticatedUser> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(AppError::auth_required());
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid ASCII"))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::auth_invalid("Authorization header must carry a Bearer token"))?;

    let claims = auth_manager.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        AppError::from(e)
    })?;

    tracing::Span::current().record("user_id", claims.sub.as_str());
    Ok(AuthenticatedUser {
        user_id: claims.sub,
    })
}
