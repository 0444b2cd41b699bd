//! Telegram bot that converts amounts between currencies using a remote rate API.

pub mod config;
pub mod convertor;
pub mod currency;
pub mod router;
pub mod telegram;

pub use config::{Config, ConfigError};
pub use convertor::{ConvertError, CurrencyConvertor};
pub use currency::{ConversionRequest, Currency};
pub use router::{CommandRouter, MenuCommand};
pub use telegram::{Messenger, TelegramClient};
