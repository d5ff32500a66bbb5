//! One question/answer exchange.
//!
//! lock conversation → trim history → build prompt → delay → call provider →
//! record turn → convert reply to HTML.
//!
//! Provider failures never escape: they become a user-facing message and
//! leave the history untouched.

use tracing::{info, warn};

use roaster_core::{ConversationId, ConversationTurn};

use crate::markup::markdown_to_html;

use super::context::MessageContext;

/// Reply to a message that is empty once the mention is removed.
pub const EMPTY_QUESTION: &str =
    "Будь ласка, вкажіть тему або конкретне питання для відповіді.";

/// Outcome of one exchange, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessedReply {
    Answer {
        /// Model text as received; this is what the history keeps.
        raw: String,
        /// `raw` converted for `ParseMode::Html`.
        html: String,
        tokens_in: u32,
        tokens_out: u32,
    },
    Failed {
        /// Plain-text message for the chat.
        message: String,
        code: &'static str,
    },
}

impl ProcessedReply {
    pub fn is_answer(&self) -> bool {
        matches!(self, ProcessedReply::Answer { .. })
    }

    /// HTML to send. Failure messages are escaped the same way as answers.
    pub fn into_html(self) -> String {
        match self {
            ProcessedReply::Answer { html, .. } => html,
            ProcessedReply::Failed { message, .. } => markdown_to_html(&message),
        }
    }
}

/// Produce the reply for `text` in `conversation` and update its history.
///
/// The conversation lock is held for the whole exchange, so concurrent
/// messages in the same chat are answered one after another, each seeing the
/// previous turn. An empty question is answered with [`EMPTY_QUESTION`]
/// without touching the history or the provider.
pub async fn process_message<C: MessageContext + ?Sized>(
    ctx: &C,
    conversation: ConversationId,
    text: &str,
) -> ProcessedReply {
    if text.trim().is_empty() {
        return ProcessedReply::Failed {
            message: EMPTY_QUESTION.to_string(),
            code: "EMPTY_QUESTION",
        };
    }

    let mut history = ctx.history().lock(conversation).await;

    let window = history.window();
    let prompt = ctx.agent().prompt().build(window, text);
    info!(
        conversation = %conversation,
        window_turns = window.len(),
        total_turns = history.turns().len(),
        prompt_chars = prompt.chars().count(),
        "composed prompt"
    );

    match ctx.agent().generate(prompt).await {
        Ok(resp) => {
            let html = markdown_to_html(&resp.content);
            history.record(ConversationTurn::new(text, resp.content.clone()));
            info!(
                conversation = %conversation,
                tokens_in = resp.tokens_in,
                tokens_out = resp.tokens_out,
                finish_reason = %resp.finish_reason,
                "reply ready"
            );
            ProcessedReply::Answer {
                raw: resp.content,
                html,
                tokens_in: resp.tokens_in,
                tokens_out: resp.tokens_out,
            }
        }
        Err(e) => {
            warn!(error = %e, code = e.code(), conversation = %conversation, "LLM call failed");
            ProcessedReply::Failed {
                message: e.user_message(),
                code: e.code(),
            }
        }
    }
}
