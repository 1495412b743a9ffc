// ABOUTME: Dream journal route handlers: enriched statistics, summary, and submission
// ABOUTME: All handlers authenticate with a bearer token and delegate to the analysis service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Dream routes
//!
//! - `GET /dream-stats`: every dream of the caller with resolved themes
//! - `GET /dream-stats/summary`: aggregate counts for dashboards
//! - `POST /dream-analysis`: save a dream and optionally analyze it

use crate::{
    constants::messages,
    errors::{AppError, AppResult, ErrorCode},
    middleware::{authenticate_request, AuthenticatedUser},
    models::{EnrichedDream, NewDream, ThemeList},
    resources::ServerResources,
    stats::DreamStatsSummary,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::ALLOW, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Body of `POST /dream-analysis`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDreamRequest {
    /// Dream text (`dreamDescription` is accepted as well)
    #[serde(default, alias = "dreamDescription")]
    pub description: Option<String>,
    /// Mood label
    #[serde(default)]
    pub mood: Option<String>,
    /// Intensity as a number or numeric string
    #[serde(default)]
    pub intensity: Option<serde_json::Value>,
    /// Request an immediate analysis
    #[serde(default)]
    pub analyze_dream: bool,
}

impl SubmitDreamRequest {
    /// Check required fields and convert to an insert payload
    ///
    /// # Errors
    ///
    /// `MISSING_REQUIRED_FIELD` listing every absent field, or `INVALID_INPUT` when
    /// the intensity is not an integer
    pub fn into_new_dream(self) -> AppResult<NewDream> {
        let description = self.description.filter(|d| !d.trim().is_empty());
        let mood = self.mood.filter(|m| !m.trim().is_empty());
        let intensity = self.intensity.filter(|i| !i.is_null());

        let mut missing = Vec::new();
        if description.is_none() {
            missing.push("description");
        }
        if mood.is_none() {
            missing.push("mood");
        }
        if intensity.is_none() {
            missing.push("intensity");
        }

        match (description, mood, intensity) {
            (Some(description), Some(mood), Some(intensity)) => Ok(NewDream {
                description,
                mood,
                intensity: parse_intensity(&intensity)?,
            }),
            _ => Err(AppError::missing_fields(&missing)),
        }
    }
}

fn parse_intensity(value: &serde_json::Value) -> AppResult<i64> {
    let parsed = match value {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| AppError::invalid_input("intensity must be an integer"))
}

/// Body returned by `POST /dream-analysis`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDreamResponse {
    /// Confirmation message
    pub message: String,
    /// Id of the saved dream
    pub dream_id: Uuid,
    /// Analysis text when requested and available
    pub dream_analysis: Option<String>,
    /// Themes parsed from the analysis
    pub theme: Option<ThemeList>,
}

/// Dream route handlers
pub struct DreamRoutes;

impl DreamRoutes {
    /// Create all dream routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/dream-stats", get(Self::list_dream_stats))
            .route("/dream-stats/summary", get(Self::dream_stats_summary))
            .route(
                "/dream-analysis",
                post(Self::submit_dream).fallback(Self::post_only),
            )
            .with_state(resources)
    }

    fn authenticate(
        headers: &HeaderMap,
        resources: &ServerResources,
    ) -> AppResult<AuthenticatedUser> {
        authenticate_request(headers, &resources.auth_manager)
    }

    /// Enrich the caller's dreams, bounded by the optional stats timeout
    async fn enriched_dreams(
        resources: &ServerResources,
        user: &AuthenticatedUser,
    ) -> AppResult<Vec<EnrichedDream>> {
        let work = resources.analysis.dreams_for_owner(&user.user_id);

        match resources.stats_timeout() {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!(
                        "Dream statistics did not complete within {}s",
                        limit.as_secs()
                    ),
                )
            })?,
            None => work.await,
        }
    }

    async fn list_dream_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<Vec<EnrichedDream>>, AppError> {
        let user = Self::authenticate(&headers, &resources)?;
        let dreams = Self::enriched_dreams(&resources, &user).await?;
        info!(user_id = %user.user_id, dreams = dreams.len(), "Served dream statistics");
        Ok(Json(dreams))
    }

    async fn dream_stats_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<DreamStatsSummary>, AppError> {
        let user = Self::authenticate(&headers, &resources)?;
        let dreams = Self::enriched_dreams(&resources, &user).await?;
        Ok(Json(DreamStatsSummary::from_dreams(&dreams)))
    }

    async fn submit_dream(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<SubmitDreamRequest>, JsonRejection>,
    ) -> Result<Json<SubmitDreamResponse>, AppError> {
        let user = Self::authenticate(&headers, &resources)?;
        let Json(request) =
            body.map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))?;

        let analyze = request.analyze_dream;
        let dream = request.into_new_dream()?;
        let submission = resources
            .analysis
            .submit_dream(&user.user_id, dream, analyze)
            .await?;

        Ok(Json(SubmitDreamResponse {
            message: messages::DREAM_SAVED.to_owned(),
            dream_id: submission.dream_id,
            dream_analysis: submission.dream_analysis,
            theme: submission.theme,
        }))
    }

    async fn post_only() -> Response {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, HeaderValue::from_static("POST"))],
            Json(serde_json::json!({ "message": messages::POST_ONLY })),
        )
            .into_response()
    }
}
