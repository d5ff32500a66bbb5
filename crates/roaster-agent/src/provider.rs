use async_trait::async_trait;

/// Shown when the API answers with a non-success status.
const QUOTA_HINT_URL: &str = "https://ai.google.dev/gemini-api/docs/rate-limits";

/// Request to an LLM provider: one fully composed prompt, one answer.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Raw model text, still in the model's Markdown.
    pub content: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    /// Why generation stopped (`STOP`, `MAX_TOKENS`, ...); empty if not reported.
    pub finish_reason: String,
}

/// Common interface for LLM backends. The bot ships with Gemini; tests plug in
/// fakes here.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and error messages.
    fn name(&self) -> &str;

    /// Send one request and wait for the full response.
    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection, TLS, timeout, or body read failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with anything other than 200.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// 200 OK, but the body is not JSON or lacks the expected text path.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Short error code used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Transport(_) => "TRANSPORT",
            ProviderError::Status { .. } => "API_STATUS",
            ProviderError::Malformed(_) => "MALFORMED_RESPONSE",
        }
    }

    /// Ukrainian message shown to the chat instead of a reply.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Status { status, .. } => {
                format!("Помилка API: {status}. Перевірте квоту на {QUOTA_HINT_URL}!")
            }
            ProviderError::Transport(e) => offline_message(&e.to_string()),
            ProviderError::Malformed(detail) => offline_message(detail),
        }
    }
}

fn offline_message(detail: &str) -> String {
    format!("Помилка: {detail}. Лібертаріанська мудрість тимчасово офлайн!")
}
