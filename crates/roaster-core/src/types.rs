use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one conversation. For Telegram this is the chat id, so every
/// group and every private chat keeps its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Speaker labels used when a turn is rendered into prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLabels {
    pub user: String,
    pub bot: String,
}

impl Default for TurnLabels {
    fn default() -> Self {
        Self {
            user: "User".to_string(),
            bot: "Bot".to_string(),
        }
    }
}

/// One question/answer exchange. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    user: String,
    bot: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The raw model reply, before any markup conversion.
    pub fn bot(&self) -> &str {
        &self.bot
    }

    /// Serialized form: `"{user_label}: {user}\n{bot_label}: {bot}\n"`.
    pub fn render(&self, labels: &TurnLabels) -> String {
        format!(
            "{}: {}\n{}: {}\n",
            labels.user, self.user, labels.bot, self.bot
        )
    }

    /// Length of [`render`](Self::render) in characters (not bytes).
    pub fn rendered_chars(&self, labels: &TurnLabels) -> usize {
        // ": " + "\n" twice
        labels.user.chars().count()
            + labels.bot.chars().count()
            + self.user.chars().count()
            + self.bot.chars().count()
            + 6
    }
}

/// A text message addressed to the bot, already stripped of the mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation: ConversationId,
    pub text: String,
    pub reply_to_bot: bool,
}
