//! # handler-chain
//!
//! Per-bot command routing. A [`HandlerChain`] maps command names to [`CommandHandler`]s,
//! dispatches an [`InboundUpdate`] to the matching one and delivers exactly one reply: the
//! handler's own, or its fallback when the handler (or delivery of its reply) failed.

use async_trait::async_trait;
use dbot_core::{
    Bot, CommandContext, CommandHandler, HandlerError, InboundUpdate, Reply, ReplyOptions, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A concrete bot's command set. Each bot is a variant of this interface, registering its
/// handlers into a fresh chain at startup.
pub trait CommandSet: Send + Sync {
    /// Human-readable bot name used in logs.
    fn name(&self) -> &str;
    /// Registers every command of this bot.
    fn register(&self, chain: HandlerChain) -> HandlerChain;
}

/// What happened to a dispatched update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran and one reply was sent. `fallback` is true when the user got the
    /// handler's fallback text instead of its regular reply.
    Replied { command: String, fallback: bool },
    /// Not a command, not for this bot, or no handler registered for it.
    Ignored,
}

/// Handler that always answers with the same reply (welcome and help texts).
#[derive(Debug, Clone)]
pub struct StaticReply {
    reply: Reply,
}

impl StaticReply {
    pub fn new(reply: Reply) -> Self {
        Self { reply }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Reply::plain(text))
    }
}

#[async_trait]
impl CommandHandler for StaticReply {
    async fn handle(&self, _ctx: &CommandContext) -> std::result::Result<Reply, HandlerError> {
        Ok(self.reply.clone())
    }
}

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `/command`. Names are matched case-insensitively; registering the
    /// same name twice replaces the earlier handler.
    pub fn register(mut self, command: &str, handler: Arc<dyn CommandHandler>) -> Self {
        let name = command.trim_start_matches('/').to_ascii_lowercase();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(command = %name, "Command handler replaced");
        }
        self
    }

    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(&command.to_ascii_lowercase())
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Routes `update` to its command handler and sends the resulting reply through `bot`.
    ///
    /// Handler failures never escape: they become the handler's fallback reply. The only error
    /// returned is a failure to deliver even the plain-text fallback.
    #[instrument(skip(self, update, bot), fields(update_id = update.update_id, chat_id = update.chat.id))]
    pub async fn dispatch(
        &self,
        update: InboundUpdate,
        bot: Arc<dyn Bot>,
        bot_username: Option<&str>,
    ) -> Result<DispatchOutcome> {
        let Some(command) = update.command() else {
            debug!("Update carries no command, ignored");
            return Ok(DispatchOutcome::Ignored);
        };
        if !command.is_addressed_to(bot_username) {
            debug!(command = %command.name, mention = ?command.mention, "Command addressed to another bot");
            return Ok(DispatchOutcome::Ignored);
        }
        let Some(handler) = self.handlers.get(&command.name).cloned() else {
            debug!(command = %command.name, "No handler registered, ignored");
            return Ok(DispatchOutcome::Ignored);
        };

        let name = command.name.clone();
        info!(command = %name, args = command.args.len(), "step: handler processing");

        let ctx = CommandContext {
            update,
            command,
            bot: bot.clone(),
        };

        let (reply, used_fallback) = match handler.handle(&ctx).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                warn!(command = %name, error = %e, "Handler failed, sending fallback");
                (handler.fallback(&e), true)
            }
        };

        let chat = ctx.chat();
        let delivered = bot.send_message(chat, &reply.text, &reply.options).await;
        if let Err(e) = delivered {
            warn!(command = %name, error = %e, "Reply delivery failed, retrying as plain text");
            let retry = if used_fallback {
                Reply::plain(reply.text)
            } else {
                handler.fallback(&HandlerError::Delivery(e.to_string()))
            };
            bot.send_message(chat, &retry.text, &ReplyOptions::default())
                .await?;
            info!(command = %name, "step: fallback reply sent");
            return Ok(DispatchOutcome::Replied {
                command: name,
                fallback: true,
            });
        }

        info!(command = %name, fallback = used_fallback, "step: reply sent");
        Ok(DispatchOutcome::Replied {
            command: name,
            fallback: used_fallback,
        })
    }
}
