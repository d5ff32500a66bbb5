//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling loop
//! until the process is interrupted. No public URL required.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};

use roaster_agent::pipeline::MessageContext;
use roaster_core::config::TelegramConfig;

use crate::commands;
use crate::error::TelegramError;
use crate::handler::handle_message;

pub struct TelegramAdapter<C: MessageContext + 'static> {
    ctx: Arc<C>,
    config: TelegramConfig,
}

impl<C: MessageContext + 'static> TelegramAdapter<C> {
    pub fn new(config: &TelegramConfig, ctx: Arc<C>) -> Self {
        Self {
            ctx,
            config: config.clone(),
        }
    }

    /// Resolve the bot identity, register the command menu, then poll until
    /// Ctrl-C.
    ///
    /// Fails only if `getMe` fails (bad token, no network) or the bot account
    /// has no username.
    pub async fn run(self) -> Result<(), TelegramError> {
        let bot = Bot::new(&self.config.bot_token);

        let me = bot.get_me().await?;
        let Some(username) = me.user.username.clone() else {
            return Err(TelegramError::NoUsername);
        };
        info!(username = %username, bot_id = me.user.id.0, "Telegram: bot identity resolved");

        if let Err(e) = bot.set_my_commands(commands::menu()).await {
            warn!(error = %e, "Telegram: failed to register command menu");
        }

        info!("Telegram: starting long-polling dispatcher");

        let handler = Update::filter_message().endpoint(handle_message::<C>);

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![self.ctx, self.config, me])
            .default_handler(|_upd| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram: dispatcher stopped");
        Ok(())
    }
}
