//! Message sending helpers for the Telegram adapter.
//!
//! Telegram's message limit is 4096 characters; chunks are capped at 4090.
//! Replies go out with `ParseMode::Html`; a chunk Telegram refuses to parse is
//! re-sent as plain text.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, ReplyParameters};
use tracing::warn;

/// Maximum characters per Telegram message (limit is 4096; we use 4090).
const CHUNK_MAX: usize = 4090;
/// Room kept free in a force-split chunk for closing and reopening tags.
const TAG_RESERVE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
}

impl Tag {
    fn from_atom(atom: &str) -> Option<(Tag, bool)> {
        match atom {
            "<b>" => Some((Tag::Bold, true)),
            "</b>" => Some((Tag::Bold, false)),
            "<i>" => Some((Tag::Italic, true)),
            "</i>" => Some((Tag::Italic, false)),
            _ => None,
        }
    }

    fn open(self) -> &'static str {
        match self {
            Tag::Bold => "<b>",
            Tag::Italic => "<i>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Tag::Bold => "</b>",
            Tag::Italic => "</i>",
        }
    }
}

/// Tag-aware splitter for HTML replies.
///
/// Splits on line boundaries first. Emphasis never spans a line, so those
/// splits always leave tags balanced. A single line longer than the limit is
/// cut between tags/entities (preferring the last space); tags open at the
/// cut are closed at the end of the chunk and reopened in the next one.
pub fn split_chunks_html(html: &str) -> Vec<String> {
    if html.chars().count() <= CHUNK_MAX {
        return vec![html.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in html.split('\n') {
        let line_len = line.chars().count();
        let cost = if current.is_empty() {
            line_len
        } else {
            1 + line_len
        };

        if current_len + cost <= CHUNK_MAX {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += cost;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= CHUNK_MAX {
            current.push_str(line);
            current_len = line_len;
        } else {
            let mut pieces = force_split_line(line, CHUNK_MAX - TAG_RESERVE);
            // The tail may still share a chunk with the following lines.
            if let Some(tail) = pieces.pop() {
                chunks.extend(pieces);
                current_len = tail.chars().count();
                current = tail;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    // Telegram rejects messages with no visible text.
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

/// Break one long line into pieces of at most `budget` characters plus the
/// closing tags.
fn force_split_line(line: &str, budget: usize) -> Vec<String> {
    struct Cut {
        at: usize,
        open: Vec<Tag>,
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut open: Vec<Tag> = Vec::new();
    let mut last_space: Option<Cut> = None;

    for atom in atoms(line) {
        let atom_len = atom.chars().count();

        if current_len + atom_len > budget && !current.is_empty() {
            let (mut piece, rest, open_at_cut) = match last_space.take() {
                Some(cut) => {
                    let rest = current.split_off(cut.at);
                    (current, rest, cut.open)
                }
                None => (current, String::new(), open.clone()),
            };
            let piece_trimmed_len = piece.trim_end().len();
            piece.truncate(piece_trimmed_len);
            // A run of blanks longer than the budget leaves nothing to send.
            if !piece.is_empty() {
                for tag in open_at_cut.iter().rev() {
                    piece.push_str(tag.close());
                }
                pieces.push(piece);
            }

            current = open_at_cut.iter().map(|t| t.open()).collect();
            current.push_str(&rest);
            current_len = current.chars().count();
        }

        current.push_str(atom);
        current_len += atom_len;

        match Tag::from_atom(atom) {
            Some((tag, true)) => open.push(tag),
            Some((tag, false)) => {
                if let Some(pos) = open.iter().rposition(|t| *t == tag) {
                    open.remove(pos);
                }
            }
            None if atom == " " => {
                last_space = Some(Cut {
                    at: current.len(),
                    open: open.clone(),
                });
            }
            None => {}
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split into indivisible units: `<…>` tags, `&…;` entities, single chars.
fn atoms(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < line.len() {
        let rest = &line[idx..];
        let len = match rest.as_bytes()[0] {
            b'<' => rest.find('>').map(|p| p + 1),
            b'&' => rest.find(';').filter(|p| *p <= 8).map(|p| p + 1),
            _ => None,
        }
        .unwrap_or_else(|| rest.chars().next().map(char::len_utf8).unwrap_or(1));
        out.push(&rest[..len]);
        idx += len;
    }
    out
}

/// Strip our tags and decode the entities the converter produces.
pub fn html_to_plain(html: &str) -> String {
    atoms(html)
        .into_iter()
        .filter(|a| Tag::from_atom(a).is_none())
        .map(|a| match a {
            "&amp;" => "&",
            "&lt;" => "<",
            "&gt;" => ">",
            "&quot;" => "\"",
            "&#x27;" => "'",
            other => other,
        })
        .collect()
}

/// Send an HTML reply to `chat_id`, threaded under `reply_to`.
///
/// Long replies are chunked; only the first chunk is threaded. A chunk
/// Telegram rejects as HTML is re-sent as plain text. 100ms pause between
/// chunks.
pub async fn send_html_reply(bot: &Bot, chat_id: ChatId, reply_to: MessageId, html: &str) {
    let chunks = split_chunks_html(html);
    for (i, chunk) in chunks.iter().enumerate() {
        let mut request = bot.send_message(chat_id, chunk).parse_mode(ParseMode::Html);
        if i == 0 {
            request = request.reply_parameters(ReplyParameters::new(reply_to));
        }

        if let Err(e) = request.await {
            warn!(error = %e, chunk_index = i, "Telegram: HTML rejected, sending plain text");
            if let Err(e) = bot.send_message(chat_id, html_to_plain(chunk)).await {
                warn!(error = %e, chunk_index = i, "Telegram: failed to send plain-text fallback");
            }
        }

        if i + 1 < chunks.len() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Send a short plain-text reply (commands, validation).
pub async fn send_plain_reply(bot: &Bot, chat_id: ChatId, reply_to: MessageId, text: &str) {
    if let Err(e) = bot
        .send_message(chat_id, text)
        .reply_parameters(ReplyParameters::new(reply_to))
        .await
    {
        warn!(error = %e, chat_id = chat_id.0, "Telegram: failed to send reply");
    }
}
