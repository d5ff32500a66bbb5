use std::time::Duration;

use roaster_agent::pipeline::MessageContext;
use roaster_agent::prompt::PromptBuilder;
use roaster_agent::{AgentRuntime, GeminiProvider, ProviderError};
use roaster_core::RoasterConfig;
use roaster_memory::{HistoryManager, WindowLimits};

/// Central shared state, passed as `Arc<AppState>` to the Telegram adapter.
pub struct AppState {
    pub config: RoasterConfig,
    pub agent: AgentRuntime,
    pub history: HistoryManager,
}

impl AppState {
    /// Wire the Gemini provider, prompt builder and history store from config.
    pub fn from_config(config: RoasterConfig) -> Result<Self, ProviderError> {
        let gemini = &config.gemini;
        let provider = GeminiProvider::new(
            gemini.api_key.clone(),
            Some(gemini.base_url.clone()),
            gemini.timeout_secs.map(Duration::from_secs),
        )?;

        let prompt = PromptBuilder::load(&config.prompt);
        let agent = AgentRuntime::new(Box::new(provider), prompt, gemini.model.clone())
            .with_request_delay(Duration::from_millis(gemini.request_delay_ms));

        let limits = WindowLimits {
            max_turns: config.history.max_turns,
            max_chars: config.history.max_chars,
        };
        let history = HistoryManager::new(limits, config.prompt.labels());

        Ok(Self {
            config,
            agent,
            history,
        })
    }
}

impl MessageContext for AppState {
    fn agent(&self) -> &AgentRuntime {
        &self.agent
    }

    fn history(&self) -> &HistoryManager {
        &self.history
    }
}
