//! Local slash commands: `/start` and `/clear`.
//!
//! Any other `/command` is ignored, so commands meant for other bots in a
//! group never reach the model.

use teloxide::types::BotCommand;

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Clear,
}

/// Parse the leading `/command` (optionally `/command@bot_username`).
///
/// Returns `None` for unknown commands and for commands addressed to a
/// different bot.
pub fn parse_command(text: &str, bot_username: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = match name.split_once('@') {
        Some((name, target)) if target.eq_ignore_ascii_case(bot_username) => name,
        Some(_) => return None,
        None => name,
    };
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "clear" => Some(Command::Clear),
        _ => None,
    }
}

/// `/start` reply.
pub fn greeting(bot_username: &str) -> String {
    format!(
        "Привіт! Я лібертаріанський бот, який відповідає фактами, просуваючи свободу та \
         мінімальну роль держави. Тегни мене (@{bot_username}), відповідай на мої \
         повідомлення або попроси план чи детальну відповідь!"
    )
}

/// `/clear` reply.
pub fn cleared(removed: usize) -> String {
    format!("Історію розмови очищено. Видалено обмінів: {removed}.")
}

/// Command menu registered with `setMyCommands`.
pub fn menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Привітання та як мною користуватися"),
        BotCommand::new("clear", "Очистити історію розмови в цьому чаті"),
    ]
}
