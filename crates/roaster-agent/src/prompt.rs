//! Prompt composition: system instruction, recent history, new message.

use std::path::Path;

use tracing::{info, warn};

use roaster_core::config::PromptConfig;
use roaster_core::{ConversationTurn, TurnLabels};

/// Builds the single text prompt sent to the model.
///
/// Layout:
/// ```text
/// {system}
///
/// {history_header}
/// {user_label}: ...
/// {bot_label}: ...
///
/// {message_header} {message}
/// ```
/// The history block is omitted when the window is empty.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system: String,
    labels: TurnLabels,
    history_header: String,
    message_header: String,
}

impl PromptBuilder {
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            system: config.system.trim().to_string(),
            labels: config.labels(),
            history_header: config.history_header.clone(),
            message_header: config.message_header.clone(),
        }
    }

    /// Like [`new`](Self::new), but reads the system instruction from
    /// `system_path` when set. An unreadable or empty file falls back to the
    /// inline `system` text.
    pub fn load(config: &PromptConfig) -> Self {
        let mut builder = Self::new(config);
        if let Some(path) = config.system_path.as_deref() {
            match read_system_file(Path::new(path)) {
                Some(text) => {
                    info!(path, chars = text.chars().count(), "loaded system prompt from file");
                    builder.system = text;
                }
                None => warn!(path, "system prompt file unusable, using inline prompt"),
            }
        }
        builder
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn labels(&self) -> &TurnLabels {
        &self.labels
    }

    pub fn build(&self, window: &[ConversationTurn], message: &str) -> String {
        let mut out = String::with_capacity(self.system.len() + message.len() + 256);
        out.push_str(&self.system);
        out.push('\n');

        if !window.is_empty() {
            out.push('\n');
            out.push_str(&self.history_header);
            out.push('\n');
            for turn in window {
                out.push_str(&turn.render(&self.labels));
            }
        }

        out.push('\n');
        out.push_str(&self.message_header);
        out.push(' ');
        out.push_str(message);
        out
    }
}

fn read_system_file(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
