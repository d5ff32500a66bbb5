//! Per-conversation history: the in-process store and the window policy that
//! decides which recent turns travel with each prompt.

pub mod manager;
pub mod window;

pub use manager::{ConversationGuard, HistoryManager};
pub use window::{trim_history, WindowLimits};
