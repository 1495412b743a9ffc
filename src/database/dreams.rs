// ABOUTME: SQLite queries for dream records: list, fetch, insert, and analysis updates
// ABOUTME: Timestamps are RFC 3339 text and theme lists are JSON arrays
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{Database, DreamStore};
use crate::errors::{AppError, AppResult};
use crate::models::{DreamRecord, NewDream, ThemeList};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

const DREAM_COLUMNS: &str =
    "id, owner_id, description, mood, intensity, created_at, analysis, themes";

/// Fixed-width timestamp so lexical order matches chronological order
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_dream(row: &SqliteRow) -> AppResult<DreamRecord> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let themes: Option<String> = row.get("themes");

    let id = Uuid::parse_str(&id)
        .map_err(|e| AppError::database(format!("Invalid dream id '{id}': {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| AppError::database(format!("Invalid timestamp on dream {id}: {e}")))?
        .with_timezone(&Utc);
    let themes = themes
        .map(|raw| serde_json::from_str::<ThemeList>(&raw))
        .transpose()
        .map_err(|e| AppError::database(format!("Invalid themes on dream {id}: {e}")))?;

    Ok(DreamRecord {
        id,
        owner_id: row.get("owner_id"),
        description: row.get("description"),
        mood: row.get("mood"),
        intensity: row.get("intensity"),
        created_at,
        analysis: row.get("analysis"),
        themes,
    })
}

#[async_trait]
impl DreamStore for Database {
    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<DreamRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {DREAM_COLUMNS} FROM dreams WHERE owner_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to list dreams: {e}")))?;

        rows.iter().map(row_to_dream).collect()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<DreamRecord>> {
        let row = sqlx::query(&format!("SELECT {DREAM_COLUMNS} FROM dreams WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to get dream: {e}")))?;

        row.as_ref().map(row_to_dream).transpose()
    }

    async fn insert(&self, owner_id: &str, dream: &NewDream) -> AppResult<DreamRecord> {
        let id = Uuid::new_v4();
        // Stored with microsecond precision
        let created_at = Utc::now().trunc_subsecs(6);

        sqlx::query(
            r"
            INSERT INTO dreams (id, owner_id, description, mood, intensity, created_at, analysis, themes)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, NULL)
            ",
        )
        .bind(id.to_string())
        .bind(owner_id)
        .bind(&dream.description)
        .bind(&dream.mood)
        .bind(dream.intensity)
        .bind(format_timestamp(created_at))
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to save dream: {e}")))?;

        Ok(DreamRecord {
            id,
            owner_id: owner_id.to_owned(),
            description: dream.description.clone(),
            mood: dream.mood.clone(),
            intensity: dream.intensity,
            created_at,
            analysis: None,
            themes: None,
        })
    }

    async fn update_analysis(
        &self,
        id: Uuid,
        analysis: &str,
        themes: &ThemeList,
    ) -> AppResult<()> {
        let themes_json = serde_json::to_string(themes)?;

        let result = sqlx::query("UPDATE dreams SET analysis = $1, themes = $2 WHERE id = $3")
            .bind(analysis)
            .bind(themes_json)
            .bind(id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to update dream analysis: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Dream {id}")).with_resource_id(id.to_string()));
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))
    }
}
