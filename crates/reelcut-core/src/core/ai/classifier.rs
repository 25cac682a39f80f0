//! Provider-Backed Classifiers
//!
//! Adapts an [`AIProvider`] to the [`Classifier`] seam used by the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::prompts;
use super::provider::{AIProvider, CompletionRequest, FinishReason};
use crate::core::selection::{ClassificationContext, Classifier, WindowRequest};
use crate::core::CoreResult;

/// What the classifier is asked to find in each window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationTask {
    /// Indices of cues worth keeping
    #[default]
    HighlightSelection,
    /// Indices of words that end a phrase
    PhraseBoundaries,
}

/// A [`Classifier`] that renders a prompt and asks a completion provider
pub struct ProviderClassifier {
    provider: Arc<dyn AIProvider>,
    task: ClassificationTask,
    model: Option<String>,
    temperature: Option<f32>,
}

impl ProviderClassifier {
    /// Creates a classifier for `task`
    pub fn new(provider: Arc<dyn AIProvider>, task: ClassificationTask) -> Self {
        Self {
            provider,
            task,
            model: None,
            temperature: None,
        }
    }

    /// Shorthand for highlight selection
    pub fn highlights(provider: Arc<dyn AIProvider>) -> Self {
        Self::new(provider, ClassificationTask::HighlightSelection)
    }

    /// Shorthand for phrase-boundary detection
    pub fn phrase_boundaries(provider: Arc<dyn AIProvider>) -> Self {
        Self::new(provider, ClassificationTask::PhraseBoundaries)
    }

    /// Overrides the provider's default model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Sets the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn task(&self) -> ClassificationTask {
        self.task
    }

    fn build_request(
        &self,
        request: &WindowRequest,
        context: &ClassificationContext,
    ) -> CompletionRequest {
        let (system, prompt) = match self.task {
            ClassificationTask::HighlightSelection => (
                prompts::highlight_system_prompt(context.reduction),
                prompts::highlight_prompt(request, context),
            ),
            ClassificationTask::PhraseBoundaries => (
                prompts::PHRASE_BOUNDARY_SYSTEM_PROMPT.to_string(),
                prompts::phrase_boundary_prompt(request),
            ),
        };

        let mut completion = CompletionRequest::new(&prompt)
            .with_system(&system)
            .with_json_mode();
        if let Some(model) = &self.model {
            completion = completion.with_model(model);
        }
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }
        completion
    }
}

#[async_trait]
impl Classifier for ProviderClassifier {
    async fn classify(
        &self,
        request: &WindowRequest,
        context: &ClassificationContext,
    ) -> CoreResult<String> {
        let completion = self.build_request(request, context);
        let response = self.provider.complete(completion).await?;

        if response.finish_reason != FinishReason::Stop {
            warn!(
                provider = self.provider.name(),
                window = request.window.ordinal,
                finish_reason = ?response.finish_reason,
                "Completion did not finish normally"
            );
        }

        Ok(response.text)
    }
}
