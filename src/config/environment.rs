// ABOUTME: Environment-based configuration for server, auth, storage, and the analysis pipeline
// ABOUTME: Parses typed settings with defaults and reports invalid values with context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use crate::constants::{analysis, defaults, env_config, themes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Which analysis provider the server talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisBackendKind {
    /// OpenAI-compatible `chat/completions`
    #[default]
    Chat,
    /// Plain `{description} -> {analysis}` endpoint
    Endpoint,
}

impl FromStr for AnalysisBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chat" | "openai" => Ok(Self::Chat),
            "endpoint" => Ok(Self::Endpoint),
            other => Err(anyhow::anyhow!(
                "unknown analysis backend '{other}' (expected 'chat' or 'endpoint')"
            )),
        }
    }
}

impl fmt::Display for AnalysisBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Endpoint => write!(f, "endpoint"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,
}

/// Bearer token configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*`
    pub allowed_origins: String,
}

/// Analysis pipeline configuration
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Backend kind
    pub backend: AnalysisBackendKind,
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Endpoint URL for the `endpoint` backend
    pub endpoint_url: Option<String>,
    /// Bearer key for the provider
    pub api_key: Option<String>,
    /// Chat model
    pub model: String,
    /// Token budget per answer
    pub max_tokens: u32,
    /// Minimum spacing between outbound calls
    pub min_interval: Duration,
    /// Attempt budget for rate-limited calls
    pub max_attempts: u32,
    /// Delay when a 429 carries no usable hint
    pub default_retry_after: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Label preceding the theme list in analysis text
    pub theme_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: AnalysisBackendKind::Chat,
            base_url: analysis::DEFAULT_BASE_URL.to_owned(),
            endpoint_url: None,
            api_key: None,
            model: analysis::DEFAULT_MODEL.to_owned(),
            max_tokens: analysis::DEFAULT_MAX_TOKENS,
            min_interval: Duration::from_secs(analysis::MIN_CALL_INTERVAL_SECS),
            max_attempts: analysis::MAX_ATTEMPTS,
            default_retry_after: Duration::from_secs(analysis::DEFAULT_RETRY_AFTER_SECS),
            request_timeout: Duration::from_secs(analysis::REQUEST_TIMEOUT_SECS),
            theme_label: themes::DEFAULT_LABEL.to_owned(),
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("endpoint_url", &self.endpoint_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("min_interval", &self.min_interval)
            .field("max_attempts", &self.max_attempts)
            .field("default_retry_after", &self.default_retry_after)
            .field("request_timeout", &self.request_timeout)
            .field("theme_label", &self.theme_label)
            .finish()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Storage settings
    pub database: DatabaseConfig,
    /// Token settings
    pub auth: AuthConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Ceiling on one statistics request; `None` waits indefinitely
    pub stats_timeout: Option<Duration>,
    /// Analysis pipeline settings
    pub analysis: AnalysisConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or a numeric value does not parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let jwt_secret = env::var(env_config::JWT_SECRET)
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .context("JWT_SECRET must be set to a non-empty value")?;

        let stats_timeout = match env::var(env_config::STATS_TIMEOUT_SECS) {
            Ok(raw) if !raw.trim().is_empty() => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("Invalid STATS_TIMEOUT_SECS value")?,
            )),
            _ => None,
        };

        let config = Self {
            http_port: env_parse(env_config::HTTP_PORT, defaults::HTTP_PORT)?,
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or(env_config::DATABASE_URL, defaults::DATABASE_URL),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_parse(
                    env_config::JWT_EXPIRY_HOURS,
                    defaults::JWT_EXPIRY_HOURS,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or(env_config::CORS_ALLOWED_ORIGINS, "*"),
            },
            stats_timeout,
            analysis: AnalysisConfig {
                backend: env_var_or(env_config::ANALYSIS_BACKEND, "chat")
                    .parse()
                    .context("Invalid ANALYSIS_BACKEND value")?,
                base_url: env_var_or(env_config::ANALYSIS_BASE_URL, analysis::DEFAULT_BASE_URL),
                endpoint_url: non_empty_var(env_config::ANALYSIS_ENDPOINT_URL),
                api_key: non_empty_var(env_config::OPENAI_API_KEY),
                model: env_var_or(env_config::ANALYSIS_MODEL, analysis::DEFAULT_MODEL),
                max_tokens: env_parse(
                    env_config::ANALYSIS_MAX_TOKENS,
                    analysis::DEFAULT_MAX_TOKENS,
                )?,
                min_interval: Duration::from_secs(env_parse(
                    env_config::ANALYSIS_MIN_INTERVAL_SECS,
                    analysis::MIN_CALL_INTERVAL_SECS,
                )?),
                max_attempts: env_parse(env_config::ANALYSIS_MAX_ATTEMPTS, analysis::MAX_ATTEMPTS)?,
                default_retry_after: Duration::from_secs(env_parse(
                    env_config::ANALYSIS_DEFAULT_RETRY_AFTER_SECS,
                    analysis::DEFAULT_RETRY_AFTER_SECS,
                )?),
                request_timeout: Duration::from_secs(env_parse(
                    env_config::ANALYSIS_REQUEST_TIMEOUT_SECS,
                    analysis::REQUEST_TIMEOUT_SECS,
                )?),
                theme_label: env_var_or(env_config::THEME_LABEL, themes::DEFAULT_LABEL),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a setting cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_attempts == 0 {
            return Err(anyhow::anyhow!("ANALYSIS_MAX_ATTEMPTS must be at least 1"));
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        if self.analysis.theme_label.trim().is_empty() {
            return Err(anyhow::anyhow!("THEME_LABEL must not be empty"));
        }

        match self.analysis.backend {
            AnalysisBackendKind::Endpoint if self.analysis.endpoint_url.is_none() => {
                return Err(anyhow::anyhow!(
                    "ANALYSIS_ENDPOINT_URL is required when ANALYSIS_BACKEND=endpoint"
                ));
            }
            AnalysisBackendKind::Chat if self.analysis.api_key.is_none() => {
                warn!("OPENAI_API_KEY is not set; analysis requests will be sent unauthenticated");
            }
            _ => {}
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Somnia Server Configuration: port={} environment={} database={} \
             analysis_backend={} model={} min_interval={}s max_attempts={} \
             stats_timeout={}",
            self.http_port,
            self.environment,
            redact_database_url(&self.database.url),
            self.analysis.backend,
            self.analysis.model,
            self.analysis.min_interval.as_secs(),
            self.analysis.max_attempts,
            self.stats_timeout
                .map_or_else(|| "none".to_owned(), |timeout| format!("{}s", timeout.as_secs())),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get environment variable, treating blank values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: '{raw}'")),
        _ => Ok(default),
    }
}

/// Hide credentials embedded in a database URL
fn redact_database_url(url: &str) -> String {
    url.split_once('@').map_or_else(
        || url.to_owned(),
        |(scheme_and_user, host)| {
            let scheme = scheme_and_user.split("://").next().unwrap_or("db");
            format!("{scheme}://***@{host}")
        },
    )
}
