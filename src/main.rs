use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use ratebot::{CommandRouter, Config, CurrencyConvertor, MenuCommand, TelegramClient};

struct BotState {
    router: CommandRouter,
    telegram: TelegramClient,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ratebot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("ratebot.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting {}...", config.bot_name);
    info!("Loaded config from {config_path}");
    info!("Rate API: {}", config.currency_api_url);

    let convertor = match CurrencyConvertor::new(
        config.currency_api_url.clone(),
        config.currency_api_key.clone(),
        config.request_timeout,
    ) {
        Ok(convertor) => convertor,
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);
    let telegram = TelegramClient::new(bot.clone());
    if let Err(e) = telegram.set_commands(MenuCommand::bot_commands()).await {
        warn!("Command menu not registered: {e}");
    }

    let state = Arc::new(BotState {
        router: CommandRouter::new(convertor, config.bot_name.clone()),
        telegram,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Stopped");
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    let sender = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or("friend");

    state
        .router
        .handle(&state.telegram, msg.chat.id.0, sender, text)
        .await;

    Ok(())
}
