//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::{debug, info};

use roaster_agent::pipeline::{process_message, MessageContext};
use roaster_core::config::TelegramConfig;
use roaster_core::{ConversationId, InboundMessage};

use crate::address::{addressed_text, Addressing};
use crate::commands::{self, Command};
use crate::send;
use crate::typing::TypingIndicator;

/// Main message handler.
///
/// Runs for every incoming `Message`:
/// 1. Ignore other bots and non-text messages
/// 2. Local commands (`/start`, `/clear`); other commands are dropped
/// 3. Addressing check (mention, reply to the bot, optional private chats)
/// 4. Spawn the reply pipeline with a typing indicator (a bare mention gets
///    the pipeline's empty-question reply)
pub async fn handle_message<C: MessageContext + 'static>(
    bot: Bot,
    msg: Message,
    ctx: Arc<C>,
    config: TelegramConfig,
    me: Me,
) -> ResponseResult<()> {
    // 1. Ignore messages from bots (including ourselves) and non-text updates.
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let bot_username = me.user.username.as_deref().unwrap_or("");
    let conversation = ConversationId(msg.chat.id.0);

    // 2. Commands.
    if text.starts_with('/') {
        match commands::parse_command(text, bot_username) {
            Some(Command::Start) => {
                send::send_plain_reply(&bot, msg.chat.id, msg.id, &commands::greeting(bot_username))
                    .await;
            }
            Some(Command::Clear) => {
                let removed = ctx.history().clear(conversation).await;
                info!(chat_id = conversation.0, removed, "Telegram: history cleared");
                send::send_plain_reply(&bot, msg.chat.id, msg.id, &commands::cleared(removed)).await;
            }
            None => debug!(chat_id = conversation.0, "Telegram: ignoring unknown command"),
        }
        return Ok(());
    }

    // 3. Addressing.
    let reply_to_bot = msg
        .reply_to_message()
        .and_then(|r| r.from.as_ref())
        .map(|u| u.id == me.user.id)
        .unwrap_or(false);
    let addressing = Addressing {
        reply_to_bot,
        private_chat: msg.chat.is_private(),
        private_without_mention: config.private_without_mention,
    };
    let Some(question) = addressed_text(text, bot_username, addressing) else {
        return Ok(());
    };

    let inbound = InboundMessage {
        conversation,
        text: question,
        reply_to_bot,
    };
    debug!(
        chat_id = inbound.conversation.0,
        reply_to_bot = inbound.reply_to_bot,
        chars = inbound.text.chars().count(),
        "Telegram: message addressed to bot"
    );

    // 4. Run the pipeline in its own task so the dispatcher keeps polling.
    let chat_id = msg.chat.id;
    let reply_to = msg.id;
    tokio::spawn(async move {
        let typing = TypingIndicator::start(bot.clone(), chat_id);
        let reply = process_message(ctx.as_ref(), inbound.conversation, &inbound.text).await;
        drop(typing);

        send::send_html_reply(&bot, chat_id, reply_to, &reply.into_html()).await;
    });

    Ok(())
}
