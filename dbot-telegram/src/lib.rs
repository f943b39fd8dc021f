//! # dbot-telegram
//!
//! Telegram transport: a teloxide-backed [`dbot_core::Bot`], webhook update parsing into
//! [`dbot_core::InboundUpdate`], and the Telegram-specific config.
//! No command logic lives here.

mod adapters;
mod bot_adapter;
mod config;

pub use adapters::{parse_update, TelegramUpdateWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
