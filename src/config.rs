use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://free.currconv.com/api/v7/convert";
pub const DEFAULT_BOT_NAME: &str = "ratebot";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Username of the bot, used to accept `/start@name` style commands.
    bot_name: Option<String>,
    #[serde(default)]
    currency_api_key: String,
    currency_api_url: Option<String>,
    /// HTTP timeout for rate requests; the client default applies when unset.
    request_timeout_secs: Option<u64>,
    /// Directory for logs. Defaults to current directory.
    data_dir: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub bot_name: String,
    pub currency_api_key: String,
    pub currency_api_url: String,
    pub request_timeout: Option<Duration>,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }
        if file.currency_api_key.trim().is_empty() {
            return Err(ConfigError::Validation("currency_api_key is required".into()));
        }

        let currency_api_url = file
            .currency_api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !currency_api_url.starts_with("http://") && !currency_api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "currency_api_url must be an http(s) URL, got '{currency_api_url}'"
            )));
        }

        if file.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation("request_timeout_secs must be positive".into()));
        }

        let bot_name = file
            .bot_name
            .map(|s| s.trim().trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            bot_name,
            currency_api_key: file.currency_api_key,
            currency_api_url,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config_with_defaults() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz",
            "currency_api_key": "secret"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.currency_api_key, "secret");
        assert_eq!(config.currency_api_url, DEFAULT_API_URL);
        assert_eq!(config.bot_name, DEFAULT_BOT_NAME);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_explicit_values() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "currency_api_key": "secret",
            "currency_api_url": "http://localhost:8080/convert",
            "bot_name": "@my_rate_bot",
            "request_timeout_secs": 10,
            "data_dir": "/var/lib/ratebot"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.currency_api_url, "http://localhost:8080/convert");
        assert_eq!(config.bot_name, "my_rate_bot");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/ratebot"));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": "",
            "currency_api_key": "secret"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon",
            "currency_api_key": "secret"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef",
            "currency_api_key": "secret"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("currency_api_key"));
    }

    #[test]
    fn test_non_http_api_url() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "currency_api_key": "secret",
            "currency_api_url": "ftp://example.com"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(err.to_string().contains("ftp://example.com"));
    }

    #[test]
    fn test_zero_timeout() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "currency_api_key": "secret",
            "request_timeout_secs": 0
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
