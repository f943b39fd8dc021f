//! Core types: user, chat, inbound update, command, reply, and the CommandHandler trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bot::{Bot, ChatAction};
use crate::error::HandlerError;

/// User identity (id, username, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (channel or private) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// One webhook delivery scoped to a single bot interaction. Built per request, consumed by at
/// most one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message_id: String,
    pub chat: Chat,
    pub user: Option<User>,
    pub text: Option<String>,
}

impl InboundUpdate {
    /// The command carried by the message text, if any.
    pub fn command(&self) -> Option<Command> {
        self.text.as_deref().and_then(Command::parse)
    }
}

/// Converts a transport-specific update into an [`InboundUpdate`]. `None` means the update
/// carries nothing a command handler could act on (e.g. a poll or a callback query).
pub trait ToCoreUpdate {
    fn to_core(&self) -> Option<InboundUpdate>;
}

/// A parsed `/name[@bot] arg1 arg2` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercased command name without the leading slash.
    pub name: String,
    /// Bot username after `@`, when the command was explicitly addressed.
    pub mention: Option<String>,
    pub args: Vec<String>,
}

impl Command {
    /// Parses message text. Returns `None` for anything that is not a slash command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention.to_string())),
            None => (head, None),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self {
            name: name.to_ascii_lowercase(),
            mention: mention.filter(|m| !m.is_empty()),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// True when the command is unaddressed or addressed to `username`.
    pub fn is_addressed_to(&self, username: Option<&str>) -> bool {
        match (&self.mention, username) {
            (None, _) => true,
            (Some(mention), Some(username)) => mention.eq_ignore_ascii_case(username),
            (Some(_), None) => false,
        }
    }
}

/// Lightweight markup applied to an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupMode {
    /// Telegram's legacy Markdown (`*bold*`, `[text](url)`).
    Markdown,
    Html,
}

/// Delivery options for an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyOptions {
    pub markup: Option<MarkupMode>,
    pub disable_link_preview: bool,
}

/// A formatted reply produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub options: ReplyOptions,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: ReplyOptions::default(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: ReplyOptions {
                markup: Some(MarkupMode::Markdown),
                disable_link_preview: false,
            },
        }
    }

    pub fn without_link_preview(mut self) -> Self {
        self.options.disable_link_preview = true;
        self
    }
}

/// Everything a handler invocation may look at: the update, its parsed command and the
/// platform client of the bot that received it.
#[derive(Clone)]
pub struct CommandContext {
    pub update: InboundUpdate,
    pub command: Command,
    pub bot: Arc<dyn Bot>,
}

impl CommandContext {
    pub fn chat(&self) -> &Chat {
        &self.update.chat
    }

    pub fn args(&self) -> &[String] {
        &self.command.args
    }

    /// Arguments joined by single spaces; `None` when there are none.
    pub fn joined_args(&self) -> Option<String> {
        if self.command.args.is_empty() {
            None
        } else {
            Some(self.command.args.join(" "))
        }
    }

    /// Shows "typing…" in the chat. Failures are logged and ignored.
    pub async fn typing(&self) {
        if let Err(e) = self
            .bot
            .send_chat_action(&self.update.chat, ChatAction::Typing)
            .await
        {
            tracing::debug!(error = %e, chat_id = self.update.chat.id, "send_chat_action failed");
        }
    }
}

/// One command's handler routine. `handle` produces the reply or a classified failure;
/// `fallback` maps a failure to the fixed text the user sees instead.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext) -> Result<Reply, HandlerError>;

    fn fallback(&self, _error: &HandlerError) -> Reply {
        Reply::plain("Sorry, something went wrong. Please try again later.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_command() {
        let cmd = Command::parse("/start").unwrap();
        assert_eq!(cmd.name, "start");
        assert!(cmd.mention.is_none());
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_parse_command_with_args_and_mention() {
        let cmd = Command::parse("/Analyze@IdeasBot  A mobile app   for pets").unwrap();
        assert_eq!(cmd.name, "analyze");
        assert_eq!(cmd.mention.as_deref(), Some("IdeasBot"));
        assert_eq!(cmd.args, vec!["A", "mobile", "app", "for", "pets"]);
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert!(Command::parse("hello /start").is_none());
        assert!(Command::parse("/").is_none());
        assert!(Command::parse("").is_none());
        assert!(Command::parse("/st-art").is_none());
    }

    #[test]
    fn test_is_addressed_to() {
        let cmd = Command::parse("/fact@wikibot").unwrap();
        assert!(cmd.is_addressed_to(Some("WikiBot")));
        assert!(!cmd.is_addressed_to(Some("otherbot")));
        assert!(!cmd.is_addressed_to(None));
        assert!(Command::parse("/fact").unwrap().is_addressed_to(None));
    }

    #[test]
    fn test_reply_builders() {
        let reply = Reply::markdown("*hi*").without_link_preview();
        assert_eq!(reply.options.markup, Some(MarkupMode::Markdown));
        assert!(reply.options.disable_link_preview);
        assert_eq!(Reply::plain("x").options, ReplyOptions::default());
    }

    #[test]
    fn test_update_command() {
        let update = InboundUpdate {
            update_id: 1,
            message_id: "7".to_string(),
            chat: Chat {
                id: 5,
                chat_type: "private".to_string(),
            },
            user: None,
            text: Some("/idea".to_string()),
        };
        assert_eq!(update.command().unwrap().name, "idea");
    }
}
