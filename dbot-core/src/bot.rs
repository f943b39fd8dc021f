//! Messaging-platform client abstraction.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it via teloxide and tests substitute
//! recording mocks.

use crate::error::Result;
use crate::types::{Chat, ReplyOptions};
use async_trait::async_trait;

/// What the platform reports about the bot account itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    pub username: Option<String>,
}

/// Chat indicator shown while a slow command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

/// Operations the gateway consumes from the messaging platform.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Fetches the bot's own account (used to learn its username during initialization).
    async fn get_me(&self) -> Result<BotIdentity>;
    /// Registers `url` as the webhook receiving this bot's updates.
    async fn set_webhook(&self, url: &str) -> Result<()>;
    /// Removes the registered webhook.
    async fn delete_webhook(&self) -> Result<()>;
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str, options: &ReplyOptions) -> Result<()>;
    /// Shows a chat action such as "typing…". Best effort.
    async fn send_chat_action(&self, chat: &Chat, action: ChatAction) -> Result<()>;
}
