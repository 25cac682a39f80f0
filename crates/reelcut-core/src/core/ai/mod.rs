//! AI Module
//!
//! Completion providers and the classifiers and summarizer built on them.

pub mod classifier;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod summary;

pub use classifier::{ClassificationTask, ProviderClassifier};
pub use provider::{
    AIProvider, CompletionRequest, CompletionResponse, FinishReason, MockAIProvider, TokenUsage,
};
pub use providers::{create_provider, ClassifierMode, OpenAIProvider, ProviderConfig, ProviderType};
pub use summary::TranscriptSummarizer;
