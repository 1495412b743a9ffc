// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Builds the shared store, auth manager, limiter, cache, and analysis service once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Server Resources
//!
//! Everything with process lifetime is created here at startup and shared through
//! one `Arc<ServerResources>`. In particular the rate limiter and the analysis cache
//! exist exactly once, so every request path throttles against the same clock.

use crate::analysis::{
    AnalysisCache, AnalysisClient, AnalysisRateLimiter, DreamAnalysisService, LabelLineParser,
};
use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::DreamStore;
use crate::errors::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Token validation
    pub auth_manager: Arc<AuthManager>,
    /// Dream storage
    pub store: Arc<dyn DreamStore>,
    /// Theme resolution pipeline
    pub analysis: DreamAnalysisService,
}

impl ServerResources {
    /// Build resources from configuration and an opened store
    ///
    /// # Errors
    ///
    /// Returns an error if the analysis backend cannot be constructed
    pub fn new(config: ServerConfig, store: Arc<dyn DreamStore>) -> AppResult<Self> {
        let client = AnalysisClient::from_config(&config.analysis)?;
        Ok(Self::with_client(config, store, client))
    }

    /// Build resources around an explicit analysis client
    #[must_use]
    pub fn with_client(
        config: ServerConfig,
        store: Arc<dyn DreamStore>,
        client: AnalysisClient,
    ) -> Self {
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        ));
        let analysis = DreamAnalysisService::new(
            store.clone(),
            AnalysisCache::new(),
            AnalysisRateLimiter::new(config.analysis.min_interval),
            client,
            Arc::new(LabelLineParser::new(&config.analysis.theme_label)),
        );

        Self {
            config: Arc::new(config),
            auth_manager,
            store,
            analysis,
        }
    }

    /// Optional ceiling on one statistics request
    #[must_use]
    pub fn stats_timeout(&self) -> Option<Duration> {
        self.config.stats_timeout
    }
}
