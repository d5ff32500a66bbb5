use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoasterError};
use crate::types::TurnLabels;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Courtesy pause before every generateContent call.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_TURNS: usize = 10;
pub const DEFAULT_MAX_CHARS: usize = 5000;

const DEFAULT_SYSTEM_PROMPT: &str = "\
Ви чат-бот у Telegram, який відповідає з позиції лібертаріанства та мінімальної ролі держави українською мовою.
- Відповідайте виключно на поточне питання (пункт \"Повідомлення\"), надаючи чітку, фактично обґрунтовану відповідь, просуваючи свободу особистості та вільний ринок.
- Використовуйте історію розмови лише для забезпечення зв’язності (наприклад, для розуміння контексту уточнювальних питань), але ніколи не коментуйте, не переказуйте та не посилайтесь на попередні питання чи відповіді.
- За замовчування відповідайте стисло (2-4 речення) з нейтральним, професійним тоном.
- Якщо користувач просить \"план\", \"список\" або \"детально\", надавайте довші відповіді з нумерованими чи маркованими списками, включаючи конкретні деталі (наприклад, цифри чи приклади), якщо вони запитуються.";

/// Top-level config (roaster.toml + ROASTER_* env overrides + the two
/// conventional secret variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoasterConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Also read from `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: String,
    /// When true, private chats are answered without an @mention.
    /// Defaults to false: every chat must mention or reply to the bot.
    #[serde(default)]
    pub private_without_mention: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent as the `key` query parameter. Also read from `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Per-request timeout. `None` leaves the transport default (no timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            timeout_secs: None,
        }
    }
}

/// Prompt layout: system instruction, history block, then the new message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_system_prompt")]
    pub system: String,
    /// Optional file whose contents replace `system` (read once at start-up).
    #[serde(default)]
    pub system_path: Option<String>,
    #[serde(default = "default_user_label")]
    pub user_label: String,
    #[serde(default = "default_bot_label")]
    pub bot_label: String,
    #[serde(default = "default_history_header")]
    pub history_header: String,
    #[serde(default = "default_message_header")]
    pub message_header: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: default_system_prompt(),
            system_path: None,
            user_label: default_user_label(),
            bot_label: default_bot_label(),
            history_header: default_history_header(),
            message_header: default_message_header(),
        }
    }
}

impl PromptConfig {
    pub fn labels(&self) -> TurnLabels {
        TurnLabels {
            user: self.user_label.clone(),
            bot: self.bot_label.clone(),
        }
    }
}

/// Bounds of the history window sent with each prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}
fn default_request_delay_ms() -> u64 {
    DEFAULT_REQUEST_DELAY_MS
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_user_label() -> String {
    TurnLabels::default().user
}
fn default_bot_label() -> String {
    TurnLabels::default().bot
}
fn default_history_header() -> String {
    "Історія розмови:".to_string()
}
fn default_message_header() -> String {
    "Повідомлення:".to_string()
}
fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}
fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

impl RoasterConfig {
    /// Load config and check that both secrets are present.
    ///
    /// File lookup: explicit path argument, else `~/.roaster/roaster.toml`.
    /// A missing file is not an error; env vars alone are enough.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RoasterConfig = Self::figment(&path)
            .extract()
            .map_err(|e| RoasterError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Layered sources, later wins: TOML file, `ROASTER_*` (nested with `__`),
    /// then `TELEGRAM_BOT_TOKEN` / `GEMINI_API_KEY`.
    pub fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ROASTER_").split("__"))
            .merge(
                Env::raw()
                    .only(&["TELEGRAM_BOT_TOKEN"])
                    .map(|_| "telegram.bot_token".into()),
            )
            .merge(
                Env::raw()
                    .only(&["GEMINI_API_KEY"])
                    .map(|_| "gemini.api_key".into()),
            )
    }

    /// Both secrets are required; blank counts as missing.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(RoasterError::MissingSecret {
                name: "telegram.bot_token",
                env: "TELEGRAM_BOT_TOKEN",
                section: "telegram",
            });
        }
        if self.gemini.api_key.trim().is_empty() {
            return Err(RoasterError::MissingSecret {
                name: "gemini.api_key",
                env: "GEMINI_API_KEY",
                section: "gemini",
            });
        }
        if self.history.max_turns == 0 {
            return Err(RoasterError::Config(
                "history.max_turns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.roaster/roaster.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_documented_values() {
        let config = RoasterConfig::default();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.request_delay_ms, 1000);
        assert_eq!(config.gemini.timeout_secs, None);
        assert_eq!(config.history.max_turns, 10);
        assert_eq!(config.history.max_chars, 5000);
        assert_eq!(config.prompt.labels(), TurnLabels::default());
        assert!(!config.telegram.private_without_mention);
    }

    #[test]
    fn secrets_from_conventional_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("TELEGRAM_BOT_TOKEN", "tok-123");
            jail.set_env("GEMINI_API_KEY", "AIza-test");

            let config: RoasterConfig = RoasterConfig::figment("missing.toml").extract()?;
            assert_eq!(config.telegram.bot_token, "tok-123");
            assert_eq!(config.gemini.api_key, "AIza-test");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn toml_file_and_prefixed_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "roaster.toml",
                r#"
                [telegram]
                bot_token = "from-file"
                private_without_mention = true

                [gemini]
                api_key = "file-key"
                model = "gemini-2.0-flash"

                [history]
                max_turns = 4
                "#,
            )?;
            jail.set_env("ROASTER_GEMINI__REQUEST_DELAY_MS", "0");
            jail.set_env("GEMINI_API_KEY", "env-key");

            let config: RoasterConfig = RoasterConfig::figment("roaster.toml").extract()?;
            assert_eq!(config.telegram.bot_token, "from-file");
            assert!(config.telegram.private_without_mention);
            assert_eq!(config.gemini.model, "gemini-2.0-flash");
            assert_eq!(config.gemini.request_delay_ms, 0);
            assert_eq!(config.gemini.api_key, "env-key");
            assert_eq!(config.history.max_turns, 4);
            assert_eq!(config.history.max_chars, 5000);
            Ok(())
        });
    }

    #[test]
    fn missing_token_is_rejected() {
        let mut config = RoasterConfig::default();
        config.gemini.api_key = "key".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "MISSING_SECRET");
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let mut config = RoasterConfig::default();
        config.telegram.bot_token = "tok".to_string();
        config.gemini.api_key = "   ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
