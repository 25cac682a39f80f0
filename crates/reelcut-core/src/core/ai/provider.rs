//! AI Provider Module
//!
//! Defines the trait and types for completion providers.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// AI Provider Trait
// =============================================================================

/// Trait for chat-completion providers (OpenAI, Gemini's compatible endpoint, mocks)
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Generates a completion from a prompt
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse>;

    /// Performs a lightweight connectivity/auth check.
    ///
    /// Must not leak secrets in error messages.
    async fn health_check(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Checks if the provider is available
    fn is_available(&self) -> bool;
}

// =============================================================================
// Completion Request
// =============================================================================

/// Request for text completion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// System prompt/instructions
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Model to use (provider-specific)
    pub model: Option<String>,
    /// Whether to request a JSON object response
    pub json_mode: bool,
}

impl CompletionRequest {
    /// Creates a new completion request
    pub fn new(prompt: &str) -> Self {
        Self {
            system: None,
            prompt: prompt.to_string(),
            max_tokens: None,
            temperature: None,
            model: None,
            json_mode: false,
        }
    }

    /// Sets the system prompt
    pub fn with_system(mut self, system: &str) -> Self {
        self.system = Some(system.to_string());
        self
    }

    /// Sets the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Enables JSON mode
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

// =============================================================================
// Completion Response
// =============================================================================

/// Response from text completion
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Model used
    pub model: String,
    /// Token usage
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// Creates a new completion response
    pub fn new(text: &str, model: &str) -> Self {
        Self {
            text: text.to_string(),
            model: model.to_string(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }
}

// =============================================================================
// Token Usage
// =============================================================================

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates a new token usage record
    pub fn new(prompt: u32, completion: u32) -> Self {
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        }
    }
}

// =============================================================================
// Finish Reason
// =============================================================================

/// Reason for completion finish
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Normal stop
    #[default]
    Stop,
    /// Reached max tokens
    Length,
    /// Content filter triggered
    ContentFilter,
}

impl FinishReason {
    /// Maps an OpenAI-style `finish_reason` string
    pub fn from_api(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => Self::Length,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Stop,
        }
    }
}

// =============================================================================
// Mock Provider (for testing)
// =============================================================================

/// Mock AI provider for testing.
///
/// Queued responses are returned first, in order; once the queue is empty
/// every call returns the fixed response. Every request is recorded.
pub struct MockAIProvider {
    name: String,
    response: String,
    queued: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    available: bool,
}

impl MockAIProvider {
    /// Creates a new mock provider
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: "Mock response".to_string(),
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// Sets the fixed mock response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Queues one-shot responses returned before the fixed one
    pub fn with_queued_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.queued.lock() {
            queue.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Returns every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        if !self.available {
            return Err(CoreError::AIRequestFailed(
                "Provider not available".to_string(),
            ));
        }

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let text = self
            .queued
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| self.response.clone());

        Ok(CompletionResponse {
            text,
            model: "mock-model".to_string(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        })
    }

    async fn health_check(&self) -> CoreResult<()> {
        if !self.available {
            return Err(CoreError::AIRequestFailed(
                "Provider not available".to_string(),
            ));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Hello")
            .with_system("Pick segments")
            .with_max_tokens(100)
            .with_temperature(0.2)
            .with_model("gpt-4o")
            .with_json_mode();

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.system, Some("Pick segments".to_string()));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.model, Some("gpt-4o".to_string()));
        assert!(request.json_mode);
    }

    #[test]
    fn test_token_usage() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_api(Some("length")), FinishReason::Length);
        assert_eq!(
            FinishReason::from_api(Some("content_filter")),
            FinishReason::ContentFilter
        );
        assert_eq!(FinishReason::from_api(None), FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_mock_provider_queue_then_fixed() {
        let provider = MockAIProvider::new("test")
            .with_response("fixed")
            .with_queued_responses(["first", "second"]);

        let mut texts = Vec::new();
        for _ in 0..3 {
            let response = provider.complete(CompletionRequest::new("x")).await.unwrap();
            texts.push(response.text);
        }

        assert_eq!(texts, vec!["first", "second", "fixed"]);
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_provider_unavailable() {
        let provider = MockAIProvider::new("test").with_available(false);

        assert!(!provider.is_available());
        assert!(provider.complete(CompletionRequest::new("x")).await.is_err());
        assert!(provider.health_check().await.is_err());
    }
}
