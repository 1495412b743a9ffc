// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, an in-memory dream store, scripted backends, and resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `somnia_server`

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use somnia_server::{
    analysis::{
        AnalysisBackend, AnalysisCache, AnalysisClient, AnalysisRateLimiter, AttemptOutcome,
        DreamAnalysisService, LabelLineParser, RetryPolicy,
    },
    config::environment::{
        AnalysisConfig, AuthConfig, CorsConfig, DatabaseConfig, Environment, ServerConfig,
    },
    database::{Database, DreamStore},
    errors::{AppError, AppResult},
    models::{DreamRecord, NewDream, ThemeList},
    resources::ServerResources,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub const TEST_JWT_SECRET: &str = "somnia-test-secret-with-enough-entropy";
pub const TEST_USER: &str = "dreamer-1";

// ============================================================================
// In-memory store
// ============================================================================

/// `DreamStore` kept in a vector, with switchable update failures
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DreamRecord>>,
    fail_updates: AtomicBool,
    update_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, record: DreamRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, id: Uuid) -> Option<DreamRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl DreamStore for MemoryStore {
    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<DreamRecord>> {
        let mut records: Vec<DreamRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<DreamRecord>> {
        Ok(self.snapshot(id))
    }

    async fn insert(&self, owner_id: &str, dream: &NewDream) -> AppResult<DreamRecord> {
        let record = DreamRecord {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_owned(),
            description: dream.description.clone(),
            mood: dream.mood.clone(),
            intensity: dream.intensity,
            created_at: Utc::now(),
            analysis: None,
            themes: None,
        };
        self.seed(record.clone());
        Ok(record)
    }

    async fn update_analysis(&self, id: Uuid, analysis: &str, themes: &ThemeList) -> AppResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::database("disk full"));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found(format!("Dream {id}")))?;
        record.analysis = Some(analysis.to_owned());
        record.themes = Some(themes.clone());
        Ok(())
    }
}

/// Raw record owned by `owner`, created `minutes_ago` minutes before now
pub fn dream_record(owner: &str, description: &str, minutes_ago: i64) -> DreamRecord {
    DreamRecord {
        id: Uuid::new_v4(),
        owner_id: owner.to_owned(),
        description: description.to_owned(),
        mood: "curious".to_owned(),
        intensity: 5,
        created_at: fixed_now() - ChronoDuration::minutes(minutes_ago),
        analysis: None,
        themes: None,
    }
}

/// Stable reference time for seeded records
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-14T08:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

// ============================================================================
// Scripted analysis backend
// ============================================================================

type Responder = dyn Fn(&str, usize) -> AppResult<AttemptOutcome> + Send + Sync;

/// Backend answering from a closure of `(description, call_index)`
pub struct ScriptedBackend {
    responder: Box<Responder>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, usize) -> AppResult<AttemptOutcome> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `text`
    pub fn answering(text: &str) -> Arc<Self> {
        let text = text.to_owned();
        Self::new(move |_, _| Ok(AttemptOutcome::Completed(text.clone())))
    }

    /// Answer 429 for the first `limited` calls, then `text`
    pub fn rate_limited_then(limited: usize, retry_after: Option<Duration>, text: &str) -> Arc<Self> {
        let text = text.to_owned();
        Self::new(move |_, index| {
            if index < limited {
                Ok(AttemptOutcome::RateLimited { retry_after })
            } else {
                Ok(AttemptOutcome::Completed(text.clone()))
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, d)| d.clone())
            .collect()
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn attempt(&self, description: &str) -> AppResult<AttemptOutcome> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), description.to_owned()));
            calls.len() - 1
        };
        (self.responder)(description, index)
    }
}

// ============================================================================
// Assembled collaborators
// ============================================================================

/// Client with the production attempt budget and an explicit default delay
pub fn client_for(backend: Arc<ScriptedBackend>, default_retry_after: Duration) -> AnalysisClient {
    AnalysisClient::new(
        backend,
        RetryPolicy {
            max_attempts: 5,
            default_retry_after,
        },
    )
}

/// Service over `store` with the given throttle interval
pub fn analysis_service(
    store: Arc<dyn DreamStore>,
    backend: Arc<ScriptedBackend>,
    min_interval: Duration,
) -> DreamAnalysisService {
    init_test_logging();
    DreamAnalysisService::new(
        store,
        AnalysisCache::new(),
        AnalysisRateLimiter::new(min_interval),
        client_for(backend, Duration::ZERO),
        Arc::new(LabelLineParser::default()),
    )
}

/// Server configuration without environment access
pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            jwt_expiry_hours: 24,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_owned(),
        },
        stats_timeout: None,
        analysis: AnalysisConfig {
            min_interval: Duration::ZERO,
            default_retry_after: Duration::ZERO,
            ..AnalysisConfig::default()
        },
    }
}

/// Resources over an in-memory `SQLite` database and a scripted backend
pub async fn create_test_resources(backend: Arc<ScriptedBackend>) -> Arc<ServerResources> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await.unwrap();
    create_test_resources_with_store(Arc::new(database), backend)
}

/// Resources over a caller-provided store
pub fn create_test_resources_with_store(
    store: Arc<dyn DreamStore>,
    backend: Arc<ScriptedBackend>,
) -> Arc<ServerResources> {
    init_test_logging();
    let config = test_server_config();
    let client = client_for(backend, config.analysis.default_retry_after);
    Arc::new(ServerResources::with_client(config, store, client))
}

/// Bearer token for `user_id` signed with the test secret
pub fn token_for(resources: &ServerResources, user_id: &str) -> String {
    resources.auth_manager.generate_token(user_id).unwrap()
}
