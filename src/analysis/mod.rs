// ABOUTME: AI dream analysis pipeline: parsing, caching, throttling, retrying, orchestration
// ABOUTME: Collaborators are constructed once at startup and injected into the service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Process-lifetime theme cache
pub mod cache;
/// Retrying provider client and HTTP backends
pub mod client;
/// Theme extraction from analysis text
pub mod parser;
/// Minimum-interval throttle for outbound calls
pub mod rate_limiter;
/// Resolution pipeline used by the dream routes
pub mod service;

pub use cache::AnalysisCache;
pub use client::{
    parse_retry_after, AnalysisBackend, AnalysisClient, AttemptOutcome, ChatCompletionBackend,
    EndpointBackend, RetryPolicy,
};
pub use parser::{LabelLineParser, ThemeParser};
pub use rate_limiter::AnalysisRateLimiter;
pub use service::DreamAnalysisService;
