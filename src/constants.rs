// ABOUTME: Re-exports application constants from somnia-core and adds env variable names
// ABOUTME: Environment keys live here because only the server crate reads the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub use somnia_core::constants::*;

/// Environment variable names read by `ServerConfig::from_env`
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Shared secret for HS256 bearer tokens
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Bearer token lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Comma-separated CORS origins, or `*`
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Optional ceiling on one statistics request, in seconds
    pub const STATS_TIMEOUT_SECS: &str = "STATS_TIMEOUT_SECS";
    /// Analysis backend kind: `chat` or `endpoint`
    pub const ANALYSIS_BACKEND: &str = "ANALYSIS_BACKEND";
    /// Base URL of the OpenAI-compatible API
    pub const ANALYSIS_BASE_URL: &str = "ANALYSIS_BASE_URL";
    /// URL of a `{description} -> {analysis}` endpoint
    pub const ANALYSIS_ENDPOINT_URL: &str = "ANALYSIS_ENDPOINT_URL";
    /// API key for the chat completion backend
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Chat model name
    pub const ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
    /// Token budget per analysis
    pub const ANALYSIS_MAX_TOKENS: &str = "ANALYSIS_MAX_TOKENS";
    /// Minimum seconds between outbound analysis calls
    pub const ANALYSIS_MIN_INTERVAL_SECS: &str = "ANALYSIS_MIN_INTERVAL_SECS";
    /// Attempt budget for rate-limited calls
    pub const ANALYSIS_MAX_ATTEMPTS: &str = "ANALYSIS_MAX_ATTEMPTS";
    /// Fallback delay when a 429 carries no `retry-after`
    pub const ANALYSIS_DEFAULT_RETRY_AFTER_SECS: &str = "ANALYSIS_DEFAULT_RETRY_AFTER_SECS";
    /// Per-request HTTP timeout for analysis calls
    pub const ANALYSIS_REQUEST_TIMEOUT_SECS: &str = "ANALYSIS_REQUEST_TIMEOUT_SECS";
    /// Label the theme parser looks for
    pub const THEME_LABEL: &str = "THEME_LABEL";
}
