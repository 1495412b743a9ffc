// ABOUTME: OpenAI-compatible chat completion wire format and response parsing
// ABOUTME: Shared by the analysis backend and the mock providers used in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # `OpenAI`-Compatible wire format
//!
//! Request and response bodies for `POST {base_url}/chat/completions`. Works with
//! the hosted `OpenAI` API and with local servers that speak the same protocol.

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatRequest};
use crate::errors::{AppError, AppResult};

/// Provider label used in error messages
pub const PROVIDER_NAME: &str = "OpenAI";

/// OpenAI-compatible API request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiRequest {
    /// Model name
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Answer token budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl OpenAiRequest {
    /// Convert a provider-neutral request, filling in `default_model`
    #[must_use]
    pub fn from_chat_request(request: &ChatRequest, default_model: &str) -> Self {
        Self {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_owned()),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Role name
    pub role: String,
    /// Text content
    pub content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

/// OpenAI-compatible API response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponse {
    /// Candidate answers
    pub choices: Vec<OpenAiChoice>,
    /// Model that produced the answer
    #[serde(default)]
    pub model: Option<String>,
}

/// Choice in response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoice {
    /// Answer message
    pub message: OpenAiResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Answer text
    #[serde(default)]
    pub content: Option<String>,
}

/// Error response from OpenAI-compatible API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiErrorResponse {
    /// Error payload
    pub error: OpenAiErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Error category
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

/// Join a base URL and an endpoint path
#[must_use]
pub fn api_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint)
}

/// Extract the trimmed text of the first choice
pub fn parse_completion(body: &str) -> AppResult<String> {
    let response: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
        AppError::external_service(PROVIDER_NAME, format!("Failed to parse response: {e}"))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AppError::external_service(PROVIDER_NAME, "API returned no choices"))?;

    let content = choice.message.content.unwrap_or_default();
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::external_service(
            PROVIDER_NAME,
            "API returned an empty answer",
        ));
    }
    Ok(trimmed.to_owned())
}

/// Best human-readable message from an error body
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
        |_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_owned()
            } else {
                trimmed.chars().take(200).collect()
            }
        },
        |parsed| parsed.error.message,
    )
}
