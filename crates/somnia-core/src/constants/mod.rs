// ABOUTME: Application constants for the dream analysis pipeline and HTTP surface
// ABOUTME: Groups throttle, retry, theme sentinel, and environment defaults by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Throttle and retry defaults for outbound AI analysis calls
pub mod analysis {
    /// Minimum interval between two outbound analysis calls (seconds)
    pub const MIN_CALL_INTERVAL_SECS: u64 = 20;

    /// Total attempts (first call included) before giving up on a rate-limited call
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Delay used when a 429 response carries no usable `retry-after` hint (seconds)
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 20;

    /// Upper bound applied to a provider's `retry-after` hint (seconds)
    pub const MAX_RETRY_AFTER_SECS: u64 = 300;

    /// Per-request timeout for the upstream HTTP call (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout for the upstream HTTP call (seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Default OpenAI-compatible base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    /// Default chat model used for dream analysis
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    /// Token budget for a single analysis answer
    pub const DEFAULT_MAX_TOKENS: u32 = 300;
}

/// Theme labels and the line label the parser looks for
pub mod themes {
    /// Label preceding the comma-separated theme list in analysis text
    pub const DEFAULT_LABEL: &str = "Themes";

    /// Sentinel: analysis text was available but contained no themes
    pub const UNSPECIFIED: &str = "Unspecified";

    /// Sentinel: analysis has not been obtained yet (retried on the next pass)
    pub const ANALYSIS_PENDING: &str = "Analysis Pending";
}

/// Service identity used in logs and health responses
pub mod service_names {
    /// Server binary / service name
    pub const SOMNIA_SERVER: &str = "somnia-server";
}

/// Default values for server configuration
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;

    /// Default database URL
    pub const DATABASE_URL: &str = "sqlite:./data/somnia.db";

    /// Default bearer token lifetime (hours)
    pub const JWT_EXPIRY_HOURS: i64 = 24;
}

/// Messages returned by the dream routes
pub mod messages {
    /// Successful dream submission
    pub const DREAM_SAVED: &str = "Dream saved successfully!";

    /// Wrong method on the submission endpoint
    pub const POST_ONLY: &str = "Only POST method is allowed.";
}
