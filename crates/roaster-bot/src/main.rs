use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

mod app;

/// Telegram bot relaying mentions and replies to Gemini.
#[derive(Debug, Parser)]
#[command(name = "roaster-bot", version)]
struct Cli {
    /// Config file (default: $ROASTER_CONFIG, then ~/.roaster/roaster.toml).
    #[arg(short, long, env = "ROASTER_CONFIG")]
    config: Option<String>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "roaster_bot=info,roaster_telegram=info,roaster_agent=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // Missing secrets are fatal: nothing useful can run without them.
    let config = match roaster_core::RoasterConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code(), "{e}");
            return Err(e.into());
        }
    };

    info!(
        model = %config.gemini.model,
        request_delay_ms = config.gemini.request_delay_ms,
        max_turns = config.history.max_turns,
        max_chars = config.history.max_chars,
        "configuration loaded"
    );

    if cli.check_config {
        info!("configuration OK");
        return Ok(());
    }

    let state = Arc::new(app::AppState::from_config(config)?);

    let adapter = roaster_telegram::TelegramAdapter::new(&state.config.telegram, Arc::clone(&state));
    adapter.run().await?;

    info!(
        conversations = state.history.conversation_count(),
        "shutting down"
    );
    Ok(())
}
