use std::time::Duration;

use tracing::info;

use crate::prompt::PromptBuilder;
use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

/// Central agent runtime: the LLM provider, the prompt builder, and the
/// request pacing. Shared by every conversation via `Arc` in the app state.
pub struct AgentRuntime {
    provider: Box<dyn LlmProvider>,
    prompt: PromptBuilder,
    model: String,
    request_delay: Duration,
}

impl AgentRuntime {
    pub fn new(provider: Box<dyn LlmProvider>, prompt: PromptBuilder, model: String) -> Self {
        Self {
            provider,
            prompt,
            model,
            request_delay: Duration::from_millis(roaster_core::config::DEFAULT_REQUEST_DELAY_MS),
        }
    }

    /// Pause inserted before every provider call.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        &*self.provider
    }

    pub fn prompt(&self) -> &PromptBuilder {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one composed prompt, after the courtesy delay. No retries.
    pub async fn generate(&self, prompt: String) -> Result<ChatResponse, ProviderError> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let req = ChatRequest {
            model: self.model.clone(),
            prompt,
        };
        info!(model = %req.model, provider = %self.provider.name(), "processing chat request");
        self.provider.send(&req).await
    }
}
