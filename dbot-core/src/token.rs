//! Bot identifier: the platform-issued secret token.
//!
//! The same string names the webhook path segment and keys the registry, so it is handled as
//! an opaque newtype that never prints in full.

use std::fmt;

/// Number of leading characters kept when a token is rendered for logs.
const VISIBLE_PREFIX: usize = 8;

/// Secret bot token. `Debug` and [`BotToken::masked`] show only the first 8 characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Full token. Only for the platform client, the registry key and the webhook URL.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Log-safe rendering: first 8 characters followed by `...`.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{}...", prefix)
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BotToken").field(&self.masked()).finish()
    }
}
