// ABOUTME: Orchestrates theme resolution: stored analysis, cache, throttle, client, parser
// ABOUTME: Enriches dream records for statistics and analyzes new submissions on request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Dream analysis service
//!
//! Resolution order for one record:
//!
//! 1. stored analysis: stored themes, or themes parsed from the stored text
//! 2. cache hit
//! 3. throttled provider call, then parse, cache, and persist
//!
//! A failed provider call yields the `Analysis Pending` sentinel. Nothing is cached
//! or persisted in that case, so the record is retried on the next pass.

use super::cache::AnalysisCache;
use super::client::AnalysisClient;
use super::parser::ThemeParser;
use super::rate_limiter::AnalysisRateLimiter;
use crate::database::DreamStore;
use crate::errors::AppResult;
use crate::models::{DreamRecord, DreamSubmission, EnrichedDream, NewDream, ThemeList};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Resolved themes plus the analysis text obtained during this pass, if any
struct Resolution {
    themes: ThemeList,
    fresh_analysis: Option<String>,
}

/// Theme resolution pipeline shared by all request handlers
#[derive(Clone)]
pub struct DreamAnalysisService {
    store: Arc<dyn DreamStore>,
    cache: AnalysisCache,
    limiter: AnalysisRateLimiter,
    client: AnalysisClient,
    parser: Arc<dyn ThemeParser>,
}

impl DreamAnalysisService {
    /// Assemble the service from injected collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn DreamStore>,
        cache: AnalysisCache,
        limiter: AnalysisRateLimiter,
        client: AnalysisClient,
        parser: Arc<dyn ThemeParser>,
    ) -> Self {
        Self {
            store,
            cache,
            limiter,
            client,
            parser,
        }
    }

    /// Shared cache handle
    #[must_use]
    pub const fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Retrying analysis client
    #[must_use]
    pub const fn client(&self) -> &AnalysisClient {
        &self.client
    }

    /// Load and enrich every dream of `owner_id`, newest first
    ///
    /// # Errors
    ///
    /// Fails only when the records cannot be loaded; per-record analysis failures
    /// degrade to the pending sentinel.
    pub async fn dreams_for_owner(&self, owner_id: &str) -> AppResult<Vec<EnrichedDream>> {
        let records = self.store.list_for_owner(owner_id).await?;
        Ok(self.enrich_all(records).await)
    }

    /// Attach themes to every record, one record at a time
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn enrich_all(&self, records: Vec<DreamRecord>) -> Vec<EnrichedDream> {
        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(self.enrich(record).await);
        }

        let pending = enriched.iter().filter(|d| d.theme.is_pending()).count();
        if pending > 0 {
            info!(pending, total = enriched.len(), "Some dreams are still awaiting analysis");
        }
        enriched
    }

    /// Attach themes to one record
    pub async fn enrich(&self, record: DreamRecord) -> EnrichedDream {
        let resolution = self.resolve(&record).await;
        EnrichedDream::from_record(record, resolution.fresh_analysis, resolution.themes)
    }

    async fn resolve(&self, record: &DreamRecord) -> Resolution {
        if let Some(analysis) = &record.analysis {
            let themes = record
                .themes
                .clone()
                .unwrap_or_else(|| self.parser.parse_themes(analysis));
            debug!(dream_id = %record.id, "Using stored analysis");
            return Resolution {
                themes,
                fresh_analysis: None,
            };
        }

        if let Some(themes) = self.cache.get(&record.id) {
            debug!(dream_id = %record.id, "Analysis cache hit");
            return Resolution {
                themes,
                fresh_analysis: None,
            };
        }

        // Another request may resolve this record while we wait for the slot
        if self
            .limiter
            .acquire_unless(|| self.cache.contains(&record.id))
            .await
            .is_none()
        {
            if let Some(themes) = self.cache.get(&record.id) {
                debug!(dream_id = %record.id, "Analysis cache filled while waiting");
                return Resolution {
                    themes,
                    fresh_analysis: None,
                };
            }
        }

        match self.client.fetch_analysis(&record.description).await {
            Ok(analysis) => {
                let themes = self.record_analysis(record.id, &analysis).await;
                Resolution {
                    themes,
                    fresh_analysis: Some(analysis),
                }
            }
            Err(error) => {
                warn!(dream_id = %record.id, error = %error, "Dream analysis failed; marking pending");
                Resolution {
                    themes: ThemeList::pending(),
                    fresh_analysis: None,
                }
            }
        }
    }

    /// Parse, cache, and persist freshly obtained analysis text
    async fn record_analysis(&self, id: Uuid, analysis: &str) -> ThemeList {
        let themes = self.parser.parse_themes(analysis);
        self.cache.put(id, themes.clone());

        if let Err(error) = self.store.update_analysis(id, analysis, &themes).await {
            warn!(dream_id = %id, error = %error, "Failed to persist dream analysis");
        } else {
            debug!(dream_id = %id, themes = ?themes.as_slice(), "Dream analysis stored");
        }
        themes
    }

    /// Save a new dream and optionally analyze it right away
    ///
    /// The raw record is always persisted first. An analysis failure is logged and
    /// reported as `dream_analysis: None`; the record is picked up again by the next
    /// enrichment pass.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank fields, or a database error if the
    /// insert fails.
    #[instrument(skip(self, dream))]
    pub async fn submit_dream(
        &self,
        owner_id: &str,
        dream: NewDream,
        analyze: bool,
    ) -> AppResult<DreamSubmission> {
        dream.validate()?;
        let record = self.store.insert(owner_id, &dream).await?;
        info!(dream_id = %record.id, "Dream saved");

        if !analyze {
            return Ok(DreamSubmission {
                dream_id: record.id,
                dream_analysis: None,
                theme: None,
            });
        }

        self.limiter.acquire().await;
        match self.client.fetch_analysis(&record.description).await {
            Ok(analysis) => {
                let themes = self.record_analysis(record.id, &analysis).await;
                Ok(DreamSubmission {
                    dream_id: record.id,
                    dream_analysis: Some(analysis),
                    theme: Some(themes),
                })
            }
            Err(error) => {
                warn!(dream_id = %record.id, error = %error, "Analysis of new dream failed");
                Ok(DreamSubmission {
                    dream_id: record.id,
                    dream_analysis: None,
                    theme: None,
                })
            }
        }
    }
}
