//! Telegram transport config: optional Bot API base URL override.
//! Loaded from TELEGRAM_API_URL (or TELOXIDE_API_URL).

use dbot_core::{DbotError, Result};
use std::env;

/// Settings shared by every bot's Telegram client.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// Loads from the environment; both variables are optional.
    pub fn from_env() -> Self {
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        Self { telegram_api_url }
    }

    /// Uses `url` as the Bot API base (e.g. a local Bot API server or a test double).
    pub fn with_api_url(url: impl Into<String>) -> Self {
        Self {
            telegram_api_url: Some(url.into()),
        }
    }

    /// The API URL must parse if it is set.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                return Err(DbotError::Config(format!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                )));
            }
        }
        Ok(())
    }
}
