//! # dbot-core
//!
//! Core types and traits for the webhook gateway: [`Bot`], [`CommandHandler`], update and reply
//! types, [`BotToken`] and tracing initialization. Transport-agnostic; used by dbot-telegram,
//! handler-chain and the gateway.

pub mod bot;
pub mod error;
pub mod logger;
pub mod token;
pub mod types;

pub use bot::{Bot, BotIdentity, ChatAction};
pub use error::{DbotError, HandlerError, Result};
pub use logger::init_tracing;
pub use token::BotToken;
pub use types::{
    Chat, Command, CommandContext, CommandHandler, InboundUpdate, MarkupMode, Reply, ReplyOptions,
    ToCoreUpdate, User,
};
