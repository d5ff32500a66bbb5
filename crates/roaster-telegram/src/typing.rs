//! Telegram typing indicator.
//!
//! The typing status expires after ~5 seconds, so it is refreshed every 4s
//! until the indicator is dropped.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatAction;

const REFRESH: Duration = Duration::from_secs(4);

/// Shows "typing…" in a chat for as long as the value lives.
pub struct TypingIndicator(tokio::task::JoinHandle<()>);

impl TypingIndicator {
    pub fn start(bot: Bot, chat_id: ChatId) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
                tokio::time::sleep(REFRESH).await;
            }
        });
        TypingIndicator(handle)
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.0.abort();
    }
}
