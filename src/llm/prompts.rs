// ABOUTME: Prompt text used to ask the model for a dream analysis
// ABOUTME: Builds the system and user messages for one dream description
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{ChatMessage, ChatRequest};

/// System instruction for analysis calls
pub const DREAM_ANALYST_SYSTEM_PROMPT: &str = "You are an expert dream analyst.";

/// User message asking for an analysis of `description`
#[must_use]
pub fn dream_analysis_prompt(description: &str) -> String {
    format!("Analyze the following dream: {description}")
}

/// Full chat request for one dream description
#[must_use]
pub fn dream_analysis_request(description: &str, model: &str, max_tokens: u32) -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(DREAM_ANALYST_SYSTEM_PROMPT),
        ChatMessage::user(dream_analysis_prompt(description)),
    ])
    .with_model(model)
    .with_max_tokens(max_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_analysis_request_layout() {
        let request = dream_analysis_request("I was late for an exam", "gpt-3.5-turbo", 300);

        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, "You are an expert dream analyst.");
        assert_eq!(
            request.messages[1].content,
            "Analyze the following dream: I was late for an exam"
        );
        assert_eq!(request.model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(request.max_tokens, Some(300));
    }
}
