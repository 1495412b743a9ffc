// ABOUTME: Dream persistence layer with a storage trait and a SQLite implementation
// ABOUTME: Opens the connection pool, creates the schema, and exposes DreamStore
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Database Management
//!
//! The analysis pipeline only needs four operations from storage, captured by the
//! [`DreamStore`] trait. [`Database`] implements it on top of a `SQLite` pool.

mod dreams;

use crate::errors::{AppError, AppResult};
use crate::models::{DreamRecord, NewDream, ThemeList};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Storage operations the dream pipeline depends on
#[async_trait]
pub trait DreamStore: Send + Sync {
    /// All records of one owner, newest first
    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<DreamRecord>>;

    /// One record by id
    async fn get(&self, id: Uuid) -> AppResult<Option<DreamRecord>>;

    /// Persist a new raw record (no analysis yet)
    async fn insert(&self, owner_id: &str, dream: &NewDream) -> AppResult<DreamRecord>;

    /// Store analysis text and derived themes on an existing record
    async fn update_analysis(&self, id: Uuid, analysis: &str, themes: &ThemeList)
        -> AppResult<()>;

    /// Readiness probe
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// `SQLite`-backed dream storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created, or a
    /// migration statement fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL '{database_url}': {e}")))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        // Every connection to `:memory:` is a separate database, so pin one
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Wrap an existing pool without running migrations
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the schema if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS dreams (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                description TEXT NOT NULL,
                mood TEXT NOT NULL,
                intensity INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                analysis TEXT,
                themes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create dreams table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_dreams_owner_created ON dreams (owner_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create dreams index: {e}")))?;

        info!("Database schema ready");
        Ok(())
    }
}
