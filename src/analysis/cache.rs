// ABOUTME: Process-lifetime cache of resolved theme lists keyed by dream record id
// ABOUTME: Concurrent map shared by clone; entries are never evicted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::models::ThemeList;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Record id to theme list mapping
///
/// Cloning shares the underlying map. There is no TTL and no eviction, so memory
/// grows with the number of distinct records analyzed while the process runs.
/// Persisted analyses make the cache redundant after a restart.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    entries: Arc<DashMap<Uuid, ThemeList>>,
}

impl AnalysisCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached themes for `id`
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<ThemeList> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Store themes for `id`, replacing any previous entry
    pub fn put(&self, id: Uuid, themes: ThemeList) {
        self.entries.insert(id, themes);
    }

    /// Whether `id` has an entry
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached records
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
