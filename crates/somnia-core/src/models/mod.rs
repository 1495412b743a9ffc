// ABOUTME: Core data models shared by the storage, analysis, and HTTP layers
// ABOUTME: Re-exports dream records, theme lists, and the enriched response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

mod dream;

pub use dream::{DreamRecord, DreamSubmission, EnrichedDream, NewDream, ThemeList};
