//! Turns inbound chat text into replies.

use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::convertor::CurrencyConvertor;
use crate::currency::Currency;
use crate::telegram::Messenger;

pub const WRONG_INPUT: &str = "Wrong input, send /help for usage help";

const HELP_TEXT: &str = "To convert an amount send:
convert <amount> <base> <quote>

Example:
convert 100 USD RUB
Result: 7070.0 RUB

Both 1.5 and 1,5 are accepted as amounts. Send /values to list supported currencies.";

/// Slash commands shown in the Telegram menu.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum MenuCommand {
    #[command(description = "greeting")]
    Start,
    #[command(description = "show usage help")]
    Help,
    #[command(description = "list supported currencies")]
    Values,
}

/// One parsed inbound message.
#[derive(Debug, PartialEq, Eq)]
pub enum Request<'a> {
    Menu(MenuCommand),
    Convert {
        amount: &'a str,
        base: &'a str,
        quote: &'a str,
    },
    Unrecognized,
}

impl<'a> Request<'a> {
    pub fn parse(text: &'a str, bot_name: &str) -> Self {
        if let Ok(cmd) = MenuCommand::parse(text, bot_name) {
            return Request::Menu(cmd);
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            &["convert", amount, base, quote] => Request::Convert {
                amount,
                base,
                quote,
            },
            _ => Request::Unrecognized,
        }
    }
}

pub struct CommandRouter {
    convertor: CurrencyConvertor,
    bot_name: String,
}

impl CommandRouter {
    pub fn new(convertor: CurrencyConvertor, bot_name: impl Into<String>) -> Self {
        Self {
            convertor,
            bot_name: bot_name.into(),
        }
    }

    /// Build the reply for `text` sent by the user displayed as `sender`.
    pub async fn reply(&self, sender: &str, text: &str) -> String {
        match Request::parse(text, &self.bot_name) {
            Request::Menu(MenuCommand::Start) => format!(
                "Hello, {sender}! I'm {}, I convert currencies at the current rate. Send /help for usage help.",
                self.bot_name
            ),
            Request::Menu(MenuCommand::Help) => HELP_TEXT.to_string(),
            Request::Menu(MenuCommand::Values) => {
                format!("Available currencies: {}", Currency::allowed_list())
            }
            Request::Convert {
                amount,
                base,
                quote,
            } => match self.convertor.get_price(base, quote, amount).await {
                Ok(value) => format!("Result: {value} {quote}"),
                Err(e) => {
                    warn!("Conversion '{text}' from {sender} failed: {e}");
                    format!("Error: {e}")
                }
            },
            Request::Unrecognized => WRONG_INPUT.to_string(),
        }
    }

    /// Reply to one inbound message. Delivery failures are logged, not returned.
    pub async fn handle(&self, messenger: &dyn Messenger, chat_id: i64, sender: &str, text: &str) {
        info!("📨 {sender} ({chat_id}): \"{text}\"");
        let reply = self.reply(sender, text).await;
        if messenger.send_message(chat_id, &reply).await.is_err() {
            warn!("Reply to chat {chat_id} was not delivered");
        }
    }
}
