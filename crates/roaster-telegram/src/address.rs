//! Decides whether a message is addressed to the bot and extracts the question.
//!
//! A message counts as addressed when it mentions `@{bot_username}` or replies
//! to one of the bot's own messages. Private chats can be configured to skip
//! the mention requirement.

/// Where a message came from, as far as addressing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addressing {
    pub reply_to_bot: bool,
    pub private_chat: bool,
    pub private_without_mention: bool,
}

/// Return the question text when the message is for the bot, `None` otherwise.
///
/// Every `@{bot_username}` mention is removed and the rest trimmed. The result
/// may be empty (a bare mention); the caller answers that with a prompt to ask
/// something.
pub fn addressed_text(text: &str, bot_username: &str, addressing: Addressing) -> Option<String> {
    if let Some(stripped) = strip_mention(text, bot_username) {
        return Some(stripped.trim().to_string());
    }
    if addressing.reply_to_bot || (addressing.private_chat && addressing.private_without_mention) {
        return Some(text.trim().to_string());
    }
    None
}

/// Remove all `@username` mentions (ASCII case-insensitive, whole handle only).
///
/// Returns `None` when the text contains no mention.
pub fn strip_mention(text: &str, bot_username: &str) -> Option<String> {
    if bot_username.is_empty() {
        return None;
    }
    let needle = format!("@{}", bot_username.to_ascii_lowercase());
    // ASCII lowercasing keeps byte offsets identical to `text`.
    let haystack = text.to_ascii_lowercase();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut found = false;
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(&needle) {
        let start = from + pos;
        let end = start + needle.len();
        let continues = haystack[end..]
            .chars()
            .next()
            .is_some_and(is_username_char);
        if !continues {
            out.push_str(&text[last..start]);
            last = end;
            found = true;
        }
        from = end;
    }
    if !found {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
