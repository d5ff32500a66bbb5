//! Markdown → Telegram HTML.
//!
//! Only `**bold**` and `*italic*` become tags. Everything else is escaped first,
//! so model or user text can never inject markup of its own. Underscore
//! italics and lists are left as plain escaped text. Unbalanced or overlapping
//! asterisks are converted best-effort: the non-greedy patterns pair the
//! nearest delimiters on the same line.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));

/// Convert model Markdown to text safe for `ParseMode::Html`.
pub fn markdown_to_html(text: &str) -> String {
    let escaped = escape_html(text);
    // Bold first, so `**` is never read as two empty italics.
    let bolded = BOLD.replace_all(&escaped, "<b>${1}</b>");
    ITALIC.replace_all(&bolded, "<i>${1}</i>").into_owned()
}

/// Escape `& < > " '` as entities Telegram's HTML parser accepts.
pub fn escape_html(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut escaped, ch| {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#x27;"),
                _ => escaped.push(ch),
            }
            escaped
        })
}
