pub mod gemini;
pub mod markup;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod runtime;

pub use gemini::GeminiProvider;
pub use markup::markdown_to_html;
pub use provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};
pub use runtime::AgentRuntime;
