//! Shared context interface for channel adapters.

use roaster_memory::HistoryManager;

use crate::runtime::AgentRuntime;

/// Minimal context the reply pipeline needs.
///
/// Implemented by `AppState` in `roaster-bot` and by test fixtures.
pub trait MessageContext: Send + Sync {
    fn agent(&self) -> &AgentRuntime;
    fn history(&self) -> &HistoryManager;
}
