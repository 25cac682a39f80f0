//! Transcript Summarization
//!
//! Produces the short running summary handed to every classification window.

use std::sync::Arc;

use tracing::info;

use super::prompts;
use super::provider::{AIProvider, CompletionRequest};
use crate::core::{CoreError, CoreResult, Cue};

/// Summarizes a whole transcript in one completion call
pub struct TranscriptSummarizer {
    provider: Arc<dyn AIProvider>,
    model: Option<String>,
}

impl TranscriptSummarizer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            model: None,
        }
    }

    /// Overrides the provider's default model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Returns a trimmed summary of `cues` in the light of `title`
    pub async fn summarize(&self, cues: &[Cue], title: &str) -> CoreResult<String> {
        let prompt = prompts::summary_prompt(cues, title);
        let mut request =
            CompletionRequest::new(&prompt).with_system(prompts::SUMMARY_SYSTEM_PROMPT);
        if let Some(model) = &self.model {
            request = request.with_model(model);
        }

        let response = self.provider.complete(request).await?;
        let summary = response.text.trim().to_string();
        if summary.is_empty() {
            return Err(CoreError::AIRequestFailed(
                "Summary completion returned no text".to_string(),
            ));
        }

        info!(
            provider = self.provider.name(),
            cues = cues.len(),
            chars = summary.len(),
            "Generated transcript summary"
        );
        Ok(summary)
    }
}
