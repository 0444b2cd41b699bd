//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{info, warn};

/// Where replies go. Implemented by [`TelegramClient`]; tests record into memory instead.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), String>;
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Publish the command menu shown next to the input field.
    pub async fn set_commands(&self, commands: Vec<BotCommand>) -> Result<(), String> {
        info!("Registering {} bot commands", commands.len());

        self.bot.set_my_commands(commands).await.map_err(|e| {
            let msg = format!("Failed to set commands: {e}");
            warn!("{}", msg);
            msg
        })?;

        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), String> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }
}
