//! History window policy.
//!
//! The window is the longest suffix of the history that fits both budgets:
//! at most `max_turns` turns and at most `max_chars` characters of rendered
//! text. Scanning stops at the first turn that does not fit, so the result is
//! always contiguous and always ends at the newest turn.

use roaster_core::config::{DEFAULT_MAX_CHARS, DEFAULT_MAX_TURNS};
use roaster_core::{ConversationTurn, TurnLabels};

/// Budgets for the history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    pub max_turns: usize,
    pub max_chars: usize,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Return the recent window of `history` (ordered oldest → newest).
///
/// A newest turn that alone exceeds `max_chars` yields an empty window; a turn
/// is never partially included.
pub fn trim_history<'a>(
    history: &'a [ConversationTurn],
    limits: &WindowLimits,
    labels: &TurnLabels,
) -> &'a [ConversationTurn] {
    let recent = &history[history.len().saturating_sub(limits.max_turns)..];

    let mut total = 0usize;
    let mut kept = 0usize;
    for turn in recent.iter().rev() {
        let len = turn.rendered_chars(labels);
        if total + len > limits.max_chars {
            break;
        }
        total += len;
        kept += 1;
    }

    &recent[recent.len() - kept..]
}
