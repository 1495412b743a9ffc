// ABOUTME: Bounded retry loop around pluggable analysis backends with 429 back-off
// ABOUTME: Chat completion and plain endpoint backends each perform one HTTP attempt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Analysis client
//!
//! [`AnalysisClient::fetch_analysis`] drives an [`AnalysisBackend`] until it returns
//! analysis text, a terminal rejection, or the attempt budget runs out on HTTP 429.
//! Only rate limiting is retried. The wait between attempts honours the provider's
//! `retry-after` hint and is an async suspension, never a blocking sleep.

use crate::config::environment::{AnalysisBackendKind, AnalysisConfig};
use crate::constants::analysis::{
    CONNECT_TIMEOUT_SECS, DEFAULT_RETRY_AFTER_SECS, MAX_ATTEMPTS, MAX_RETRY_AFTER_SECS,
};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::openai_compatible::{self, OpenAiRequest};
use crate::llm::prompts::dream_analysis_request;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a single backend attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Provider answered with analysis text
    Completed(String),
    /// Provider answered 429; `retry_after` is its hint when usable
    RateLimited {
        /// Parsed `retry-after` delay
        retry_after: Option<Duration>,
    },
    /// Provider answered with a non-retryable error status
    Rejected {
        /// HTTP status
        status: u16,
        /// Provider message
        message: String,
    },
}

/// One outbound analysis attempt
///
/// Transport failures are returned as `Err` and are not retried.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Perform exactly one request for `description`
    async fn attempt(&self, description: &str) -> AppResult<AttemptOutcome>;
}

/// Retry behaviour for rate-limited attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,
    /// Delay when a 429 carries no usable hint
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            default_retry_after: Duration::from_secs(DEFAULT_RETRY_AFTER_SECS),
        }
    }
}

/// Parse a `retry-after` header holding delay seconds
///
/// Returns `None` for absent, negative, or non-numeric values (HTTP-date form is
/// not supported). Hints above `MAX_RETRY_AFTER_SECS` are clamped to it.
#[must_use]
pub fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    let raw = value?.to_str().ok()?.trim();
    let max = Duration::from_secs(MAX_RETRY_AFTER_SECS);
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs).min(max));
    }
    let secs = raw.parse::<f64>().ok().filter(|secs| *secs >= 0.0)?;
    // Overflowing and infinite values fail the conversion and are clamped
    Some(Duration::try_from_secs_f64(secs).map_or(max, |delay| delay.min(max)))
}

/// Retrying analysis client
#[derive(Clone)]
pub struct AnalysisClient {
    backend: Arc<dyn AnalysisBackend>,
    policy: RetryPolicy,
}

impl AnalysisClient {
    /// Create a client around a backend
    #[must_use]
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Build the backend selected in configuration
    pub fn from_config(config: &AnalysisConfig) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        let backend: Arc<dyn AnalysisBackend> = match config.backend {
            AnalysisBackendKind::Chat => Arc::new(ChatCompletionBackend::new(
                http,
                &config.base_url,
                config.api_key.clone(),
                &config.model,
                config.max_tokens,
            )),
            AnalysisBackendKind::Endpoint => {
                let url = config.endpoint_url.as_deref().ok_or_else(|| {
                    AppError::new(
                        ErrorCode::ConfigMissing,
                        "ANALYSIS_ENDPOINT_URL is required for the endpoint backend",
                    )
                })?;
                Arc::new(EndpointBackend::new(http, url))
            }
        };

        Ok(Self::new(
            backend,
            RetryPolicy {
                max_attempts: config.max_attempts,
                default_retry_after: config.default_retry_after,
            },
        ))
    }

    /// Name of the configured backend
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Obtain analysis text for `description`
    ///
    /// # Errors
    ///
    /// - `EXTERNAL_SERVICE_ERROR` when the provider rejects the request
    /// - `EXTERNAL_RATE_LIMITED` when every attempt was rate limited
    /// - the backend's error when the request could not be sent
    pub async fn fetch_analysis(&self, description: &str) -> AppResult<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let backend = self.backend.name();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(backend, attempt, max_attempts, "Requesting dream analysis");

            match self.backend.attempt(description).await? {
                AttemptOutcome::Completed(text) => return Ok(text),
                AttemptOutcome::Rejected { status, message } => {
                    warn!(backend, status, %message, "Analysis request rejected");
                    return Err(AppError::analysis_rejected(status, message));
                }
                AttemptOutcome::RateLimited { retry_after } => {
                    if attempt >= max_attempts {
                        warn!(
                            backend,
                            attempt, "Analysis rate limit persisted - max retries reached"
                        );
                        return Err(AppError::analysis_retries_exhausted(attempt));
                    }

                    let delay = retry_after.unwrap_or(self.policy.default_retry_after);
                    warn!(
                        backend,
                        attempt,
                        max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        "Analysis rate limited - retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn transport_error(backend: &str, error: &reqwest::Error) -> AppError {
    let code = if error.is_timeout() || error.is_connect() {
        ErrorCode::ExternalServiceUnavailable
    } else {
        ErrorCode::ExternalServiceError
    };
    AppError::new(code, format!("{backend}: request failed: {error}"))
}

/// OpenAI-compatible `chat/completions` backend
pub struct ChatCompletionBackend {
    http: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl ChatCompletionBackend {
    /// Create a backend for `base_url` (e.g. `https://api.openai.com/v1`)
    #[must_use]
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            url: openai_compatible::api_url(base_url, "chat/completions"),
            api_key,
            model: model.to_owned(),
            max_tokens,
        }
    }
}

#[async_trait]
impl AnalysisBackend for ChatCompletionBackend {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn attempt(&self, description: &str) -> AppResult<AttemptOutcome> {
        let request = dream_analysis_request(description, &self.model, self.max_tokens);
        let body = OpenAiRequest::from_chat_request(&request, &self.model);

        let mut http_request = self.http.post(&self.url).json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| transport_error(openai_compatible::PROVIDER_NAME, &e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(AttemptOutcome::RateLimited {
                retry_after: parse_retry_after(response.headers().get(RETRY_AFTER)),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(openai_compatible::PROVIDER_NAME, &e))?;

        if !status.is_success() {
            return Ok(AttemptOutcome::Rejected {
                status: status.as_u16(),
                message: openai_compatible::error_message(&text),
            });
        }

        openai_compatible::parse_completion(&text).map(AttemptOutcome::Completed)
    }
}

/// Request body for the plain analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointRequest {
    /// Dream description
    pub description: String,
}

/// Response body of the plain analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointResponse {
    /// Analysis text
    pub analysis: String,
}

/// `POST {url}` with `{"description"}` returning `{"analysis"}`
pub struct EndpointBackend {
    http: Client,
    url: String,
}

impl EndpointBackend {
    /// Create a backend for `url`
    #[must_use]
    pub fn new(http: Client, url: &str) -> Self {
        Self {
            http,
            url: url.to_owned(),
        }
    }
}

#[async_trait]
impl AnalysisBackend for EndpointBackend {
    fn name(&self) -> &'static str {
        "analysis-endpoint"
    }

    async fn attempt(&self, description: &str) -> AppResult<AttemptOutcome> {
        let response = self
            .http
            .post(&self.url)
            .json(&EndpointRequest {
                description: description.to_owned(),
            })
            .send()
            .await
            .map_err(|e| transport_error(self.name(), &e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(AttemptOutcome::RateLimited {
                retry_after: parse_retry_after(response.headers().get(RETRY_AFTER)),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(self.name(), &e))?;

        if !status.is_success() {
            return Ok(AttemptOutcome::Rejected {
                status: status.as_u16(),
                message: openai_compatible::error_message(&text),
            });
        }

        let parsed: EndpointResponse = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(self.name(), format!("Failed to parse response: {e}"))
        })?;
        Ok(AttemptOutcome::Completed(parsed.analysis.trim().to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after_values() {
        let header = |v: &'static str| HeaderValue::from_static(v);

        assert_eq!(
            parse_retry_after(Some(&header("7"))),
            Some(Duration::from_secs(7))
        );
        assert_eq!(
            parse_retry_after(Some(&header(" 1.5 "))),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(parse_retry_after(Some(&header("soon"))), None);
        assert_eq!(parse_retry_after(Some(&header("-3"))), None);
        assert_eq!(
            parse_retry_after(Some(&header("Wed, 21 Oct 2015 07:28:00 GMT"))),
            None
        );
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_parse_retry_after_clamps_huge_hints() {
        let header = |v: &'static str| HeaderValue::from_static(v);
        let max = Some(Duration::from_secs(MAX_RETRY_AFTER_SECS));

        assert_eq!(parse_retry_after(Some(&header("1e20"))), max);
        assert_eq!(parse_retry_after(Some(&header("inf"))), max);
        assert_eq!(parse_retry_after(Some(&header("18446744073709551615"))), max);
        assert_eq!(parse_retry_after(Some(&header("86400.5"))), max);
        assert_eq!(parse_retry_after(Some(&header("NaN"))), None);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.default_retry_after, Duration::from_secs(20));
    }

    #[test]
    fn test_endpoint_backend_requires_url() {
        let config = AnalysisConfig {
            backend: AnalysisBackendKind::Endpoint,
            endpoint_url: None,
            ..AnalysisConfig::default()
        };
        let error = AnalysisClient::from_config(&config).err().unwrap();
        assert_eq!(error.code, ErrorCode::ConfigMissing);
    }
}
