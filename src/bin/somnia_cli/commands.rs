// ABOUTME: Command implementations for somnia-cli
// ABOUTME: Token minting from the shared secret and schema migration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use somnia_server::{
    auth::AuthManager,
    constants::{defaults, env_config},
    database::Database,
    errors::{AppError, AppResult, ErrorCode},
};
use std::env;
use tracing::info;

/// Print a bearer token for `user_id`
pub fn token(user_id: &str, expires_hours: Option<i64>) -> AppResult<()> {
    let secret = env::var(env_config::JWT_SECRET)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("{} must be set to mint tokens", env_config::JWT_SECRET),
            )
        })?;

    let expiry_hours = match expires_hours {
        Some(hours) => hours,
        None => env::var(env_config::JWT_EXPIRY_HOURS)
            .ok()
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|e| {
                    AppError::new(
                        ErrorCode::ConfigInvalid,
                        format!("{} must be a number: {e}", env_config::JWT_EXPIRY_HOURS),
                    )
                })
            })
            .transpose()?
            .unwrap_or(defaults::JWT_EXPIRY_HOURS),
    };
    if expiry_hours <= 0 {
        return Err(AppError::invalid_input("Token lifetime must be positive"));
    }

    let manager = AuthManager::new(secret.as_bytes(), expiry_hours);
    let token = manager.generate_token(user_id)?;
    info!(user_id, expiry_hours, "Bearer token generated");

    println!("{token}");
    Ok(())
}

/// Open the database, creating the schema if needed
pub async fn migrate(database_url: Option<String>) -> AppResult<()> {
    let database_url = database_url
        .or_else(|| env::var(env_config::DATABASE_URL).ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

    info!("Connecting to database: {}", database_url);
    Database::new(&database_url).await?;
    info!("Database schema is up to date");
    Ok(())
}
