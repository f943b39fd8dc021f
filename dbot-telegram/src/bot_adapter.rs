//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram;
//! tests point the adapter at a mock Bot API server or substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{
    Bot as CoreBot, BotIdentity, BotToken, Chat, ChatAction, DbotError, MarkupMode, ReplyOptions,
    Result,
};
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, ParseMode};
use tracing::error;

use crate::config::TelegramConfig;

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Builds a client for `token`, honoring the configured Bot API URL override.
    pub fn from_token(token: &BotToken, config: &TelegramConfig) -> Result<Self> {
        let bot = teloxide::Bot::new(token.expose());
        let bot = match config.telegram_api_url {
            Some(ref url_str) => {
                let url = reqwest::Url::parse(url_str).map_err(|e| {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL");
                    DbotError::Config(format!("Invalid TELEGRAM_API_URL: {}", e))
                })?;
                bot.set_api_url(url)
            }
            None => bot,
        };
        Ok(Self { bot })
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[allow(deprecated)]
fn parse_mode(mode: MarkupMode) -> ParseMode {
    match mode {
        MarkupMode::Markdown => ParseMode::Markdown,
        MarkupMode::Html => ParseMode::Html,
    }
}

fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn get_me(&self) -> Result<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(BotIdentity {
            username: me.user.username.clone(),
        })
    }

    async fn set_webhook(&self, url: &str) -> Result<()> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| DbotError::Config(format!("Invalid webhook URL: {}", e)))?;
        self.bot
            .set_webhook(url)
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_message(&self, chat: &Chat, text: &str, options: &ReplyOptions) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat.id), text.to_string());
        if let Some(mode) = options.markup {
            request = request.parse_mode(parse_mode(mode));
        }
        if options.disable_link_preview {
            request = request.link_preview_options(disabled_link_preview());
        }
        request.await.map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_chat_action(&self, chat: &Chat, action: ChatAction) -> Result<()> {
        let action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
        };
        self.bot
            .send_chat_action(ChatId(chat.id), action)
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(())
    }
}
