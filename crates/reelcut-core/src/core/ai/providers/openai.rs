//! OpenAI-Compatible Provider Implementation
//!
//! Implements the AIProvider trait over the chat-completions protocol, used
//! for both OpenAI and Gemini's compatibility endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ProviderConfig, ProviderType};
use crate::core::ai::provider::{AIProvider, CompletionRequest, CompletionResponse};
#[cfg(feature = "ai-providers")]
use crate::core::ai::provider::{FinishReason, TokenUsage};
use crate::core::{CoreError, CoreResult};

// =============================================================================
// OpenAI Provider
// =============================================================================

/// Chat-completions API client
pub struct OpenAIProvider {
    /// Service this client talks to
    provider_type: ProviderType,
    /// API key
    api_key: String,
    /// Base URL for API requests, without trailing slash
    #[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
    base_url: String,
    /// Default model
    #[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
    default_model: String,
    /// HTTP client
    #[cfg(feature = "ai-providers")]
    client: reqwest::Client,
}

impl OpenAIProvider {
    /// Creates a new provider
    pub fn new(config: ProviderConfig) -> CoreResult<Self> {
        let provider_type = config.provider_type;
        let api_key = config.api_key.ok_or_else(|| {
            CoreError::Configuration(format!("{} API key is required", provider_type))
        })?;

        if api_key.trim().is_empty() {
            return Err(CoreError::Configuration(format!(
                "{} API key cannot be empty",
                provider_type
            )));
        }

        let base_url = config
            .base_url
            .unwrap_or_else(|| provider_type.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let default_model = config.model.unwrap_or_else(|| match provider_type {
            ProviderType::OpenAI => "gpt-4o".to_string(),
            ProviderType::Gemini => "gemini-2.5-pro".to_string(),
        });

        #[cfg(feature = "ai-providers")]
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.timeout_secs.unwrap_or(60),
            ))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            provider_type,
            api_key,
            base_url,
            default_model,
            #[cfg(feature = "ai-providers")]
            client,
        })
    }
}

// =============================================================================
// Chat Completions API Types
// =============================================================================

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    usage: Option<ApiUsage>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[cfg_attr(not(feature = "ai-providers"), allow(dead_code))]
fn build_request(request: CompletionRequest, default_model: &str) -> ChatCompletionRequest {
    let mut messages = Vec::new();
    if let Some(system) = request.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.prompt,
    });

    ChatCompletionRequest {
        model: request.model.unwrap_or_else(|| default_model.to_string()),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        response_format: request.json_mode.then_some(ResponseFormat {
            format_type: "json_object",
        }),
    }
}

// =============================================================================
// AIProvider Implementation
// =============================================================================

#[async_trait]
impl AIProvider for OpenAIProvider {
    fn name(&self) -> &str {
        match self.provider_type {
            ProviderType::OpenAI => "openai",
            ProviderType::Gemini => "gemini",
        }
    }

    #[cfg(feature = "ai-providers")]
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        let api_request = build_request(request, &self.default_model);
        let model = api_request.model.clone();

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| CoreError::AIRequestFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::AIRequestFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let error: ApiError = serde_json::from_str(&body).unwrap_or(ApiError {
                error: ApiErrorDetail {
                    message: body.clone(),
                    error_type: None,
                },
            });
            let error_type = error.error.error_type.as_deref().unwrap_or("unknown");
            return Err(CoreError::AIRequestFailed(format!(
                "{} API error ({}; type={}): {}",
                self.provider_type, status, error_type, error.error.message
            )));
        }

        let api_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CoreError::AIRequestFailed(format!("Failed to parse response: {}", e)))?;

        let choice = api_response.choices.first().ok_or_else(|| {
            CoreError::AIRequestFailed("No completion choices returned".to_string())
        })?;

        let usage = api_response
            .usage
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            provider = %self.provider_type,
            model = %model,
            total_tokens = usage.total_tokens,
            "Completion received"
        );

        Ok(CompletionResponse {
            text: choice.message.content.clone().unwrap_or_default(),
            model: api_response.model.clone().unwrap_or(model),
            usage,
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
        })
    }

    #[cfg(not(feature = "ai-providers"))]
    async fn complete(&self, _request: CompletionRequest) -> CoreResult<CompletionResponse> {
        Err(CoreError::NotSupported(
            "AI providers feature not enabled. Build with --features ai-providers".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[cfg(feature = "ai-providers")]
    async fn health_check(&self) -> CoreResult<()> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CoreError::AIRequestFailed(format!("Health check failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(CoreError::AIRequestFailed(format!(
            "{} health check failed ({})",
            self.provider_type,
            response.status()
        )))
    }

    #[cfg(not(feature = "ai-providers"))]
    async fn health_check(&self) -> CoreResult<()> {
        Err(CoreError::NotSupported(
            "AI providers feature not enabled. Build with --features ai-providers".to_string(),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
