use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use roaster_core::{ConversationId, ConversationTurn, TurnLabels};

use crate::window::{trim_history, WindowLimits};

type Slot = Arc<Mutex<Vec<ConversationTurn>>>;

/// In-process conversation history, one append-only log per conversation.
///
/// Each conversation has its own async lock. A caller holds it for a whole
/// exchange (read window → call model → record turn), so two messages in the
/// same chat never interleave while unrelated chats proceed in parallel.
/// Nothing is persisted and nothing is evicted.
pub struct HistoryManager {
    conversations: DashMap<ConversationId, Slot>,
    limits: WindowLimits,
    labels: TurnLabels,
}

impl HistoryManager {
    pub fn new(limits: WindowLimits, labels: TurnLabels) -> Self {
        Self {
            conversations: DashMap::new(),
            limits,
            labels,
        }
    }

    pub fn limits(&self) -> &WindowLimits {
        &self.limits
    }

    pub fn labels(&self) -> &TurnLabels {
        &self.labels
    }

    /// Wait for exclusive access to one conversation, creating it on first use.
    pub async fn lock(&self, id: ConversationId) -> ConversationGuard<'_> {
        // Clone the slot out so the shard lock is released before awaiting.
        let slot: Slot = Arc::clone(self.conversations.entry(id).or_default().value());
        let turns = slot.lock_owned().await;
        ConversationGuard {
            id,
            turns,
            manager: self,
        }
    }

    /// Number of recorded turns (full history, not the window).
    pub async fn turn_count(&self, id: ConversationId) -> usize {
        let Some(slot) = self.slot(id) else {
            return 0;
        };
        let count = slot.lock().await.len();
        count
    }

    /// Drop a conversation's history. Returns how many turns were removed.
    ///
    /// Waits for any in-flight exchange in that conversation to finish first.
    pub async fn clear(&self, id: ConversationId) -> usize {
        let Some(slot) = self.slot(id) else {
            return 0;
        };
        let mut turns = slot.lock().await;
        let removed = turns.len();
        turns.clear();
        debug!(conversation = %id, removed, "history cleared");
        removed
    }

    /// Number of conversations seen since start-up.
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    fn slot(&self, id: ConversationId) -> Option<Slot> {
        self.conversations.get(&id).map(|s| Arc::clone(s.value()))
    }
}

/// Exclusive handle on one conversation's history.
pub struct ConversationGuard<'a> {
    id: ConversationId,
    turns: OwnedMutexGuard<Vec<ConversationTurn>>,
    manager: &'a HistoryManager,
}

impl ConversationGuard<'_> {
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// The trimmed recent window to send with the next prompt.
    pub fn window(&self) -> &[ConversationTurn] {
        trim_history(&self.turns, &self.manager.limits, &self.manager.labels)
    }

    /// The full, untrimmed history.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn record(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        debug!(conversation = %self.id, turns = self.turns.len(), "turn recorded");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn manager() -> HistoryManager {
        HistoryManager::new(WindowLimits::default(), TurnLabels::default())
    }

    #[tokio::test]
    async fn first_lock_creates_empty_history() {
        let history = manager();
        let guard = history.lock(ConversationId(1)).await;
        assert!(guard.turns().is_empty());
        assert!(guard.window().is_empty());
        drop(guard);
        assert_eq!(history.conversation_count(), 1);
    }

    #[tokio::test]
    async fn recorded_turns_are_kept_per_conversation() {
        let history = manager();
        {
            let mut guard = history.lock(ConversationId(1)).await;
            guard.record(ConversationTurn::new("a", "b"));
            guard.record(ConversationTurn::new("c", "d"));
        }
        {
            let mut guard = history.lock(ConversationId(2)).await;
            guard.record(ConversationTurn::new("e", "f"));
        }
        assert_eq!(history.turn_count(ConversationId(1)).await, 2);
        assert_eq!(history.turn_count(ConversationId(2)).await, 1);
        assert_eq!(history.turn_count(ConversationId(3)).await, 0);
    }

    #[tokio::test]
    async fn full_history_grows_past_window() {
        let history = manager();
        let mut guard = history.lock(ConversationId(7)).await;
        for i in 0..15 {
            guard.record(ConversationTurn::new(format!("q{i}"), "a"));
        }
        assert_eq!(guard.turns().len(), 15);
        assert_eq!(guard.window().len(), 10);
        assert_eq!(guard.window()[0].user(), "q5");
    }

    #[tokio::test]
    async fn clear_reports_removed_turns() {
        let history = manager();
        {
            let mut guard = history.lock(ConversationId(9)).await;
            guard.record(ConversationTurn::new("a", "b"));
        }
        assert_eq!(history.clear(ConversationId(9)).await, 1);
        assert_eq!(history.turn_count(ConversationId(9)).await, 0);
        assert_eq!(history.clear(ConversationId(404)).await, 0);
    }

    #[tokio::test]
    async fn same_conversation_is_serialized() {
        let history = Arc::new(manager());
        let guard = history.lock(ConversationId(1)).await;

        let h2 = Arc::clone(&history);
        let waiter = tokio::spawn(async move {
            let mut g = h2.lock(ConversationId(1)).await;
            g.record(ConversationTurn::new("second", "b"));
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Other conversations are not blocked.
        let other =
            tokio::time::timeout(Duration::from_millis(200), history.lock(ConversationId(2))).await;
        assert!(other.is_ok());
        drop(other);

        let mut guard = guard;
        guard.record(ConversationTurn::new("first", "a"));
        drop(guard);

        waiter.await.unwrap();
        let g = history.lock(ConversationId(1)).await;
        let users: Vec<&str> = g.turns().iter().map(|t| t.user()).collect();
        assert_eq!(users, vec!["first", "second"]);
    }
}
