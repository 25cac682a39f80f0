//! AI Provider Implementations
//!
//! Concrete implementations of the AIProvider trait. Both supported services
//! speak the OpenAI chat-completions protocol, so one client serves both.

mod openai;

pub use openai::OpenAIProvider;

use serde::{Deserialize, Serialize};

use super::provider::AIProvider;
use crate::core::{CoreError, CoreResult};

// =============================================================================
// Provider Configuration
// =============================================================================

/// Supported AI provider types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI GPT models
    OpenAI,
    /// Google Gemini models through the OpenAI-compatible endpoint
    Gemini,
}

impl ProviderType {
    /// Chat-completions base URL for this service
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "https://api.openai.com/v1",
            ProviderType::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "gemini" | "google" => Ok(ProviderType::Gemini),
            _ => Err(CoreError::Configuration(format!(
                "Unknown provider type: {}",
                s
            ))),
        }
    }
}

/// Configuration for creating a provider
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider type
    pub provider_type: ProviderType,
    /// API key
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Default model to use
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Creates a new OpenAI provider config
    pub fn openai(api_key: &str) -> Self {
        Self {
            provider_type: ProviderType::OpenAI,
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: Some("gpt-4o".to_string()),
            timeout_secs: Some(60),
        }
    }

    /// Creates a new Google Gemini provider config
    pub fn gemini(api_key: &str) -> Self {
        Self {
            provider_type: ProviderType::Gemini,
            api_key: Some(api_key.to_string()),
            base_url: None,
            model: Some("gemini-2.5-pro".to_string()),
            timeout_secs: Some(120),
        }
    }

    /// Sets the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Sets the base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Sets the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

// =============================================================================
// Classifier Mode
// =============================================================================

/// Speed/quality trade-off for highlight selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Faster, cheaper model
    #[default]
    Fast,
    /// Slower model with a larger context window
    Quality,
}

impl ClassifierMode {
    /// Provider type serving this mode
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ClassifierMode::Fast => ProviderType::OpenAI,
            ClassifierMode::Quality => ProviderType::Gemini,
        }
    }

    /// Default provider configuration for this mode
    pub fn provider_config(&self, api_key: &str) -> ProviderConfig {
        match self {
            ClassifierMode::Fast => ProviderConfig::openai(api_key),
            ClassifierMode::Quality => ProviderConfig::gemini(api_key),
        }
    }
}

// =============================================================================
// Provider Factory
// =============================================================================

/// Creates an AI provider from configuration
pub fn create_provider(config: ProviderConfig) -> CoreResult<Box<dyn AIProvider>> {
    let provider = OpenAIProvider::new(config)?;
    Ok(Box::new(provider))
}

// =============================================================================
// Tests
// =============================================================================
