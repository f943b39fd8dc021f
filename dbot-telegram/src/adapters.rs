//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{Chat, DbotError, InboundUpdate, Result, ToCoreUpdate, User};
use teloxide::types::{Update, UpdateKind};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> TelegramUserWrapper<'a> {
    pub fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Update for conversion to core [`InboundUpdate`].
/// Only `message` and `edited_message` updates carry commands.
pub struct TelegramUpdateWrapper<'a>(pub &'a Update);

impl<'a> ToCoreUpdate for TelegramUpdateWrapper<'a> {
    fn to_core(&self) -> Option<InboundUpdate> {
        let msg = match &self.0.kind {
            UpdateKind::Message(msg) | UpdateKind::EditedMessage(msg) => msg,
            _ => return None,
        };
        Some(InboundUpdate {
            update_id: self.0.id.0 as i64,
            message_id: msg.id.0.to_string(),
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: chat_type(&msg.chat).to_string(),
            },
            user: msg.from.as_ref().map(|u| TelegramUserWrapper(u).to_core()),
            text: msg.text().map(str::to_string),
        })
    }
}

fn chat_type(chat: &teloxide::types::Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_group() {
        "group"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    }
}

/// Deserializes a webhook body into teloxide's [`Update`] and converts it.
///
/// Malformed JSON is an error; a well-formed update of a kind no handler cares about
/// yields `Ok(None)`.
pub fn parse_update(body: &[u8]) -> Result<Option<InboundUpdate>> {
    let update: Update =
        serde_json::from_slice(body).map_err(|e| DbotError::Parse(e.to_string()))?;
    Ok(TelegramUpdateWrapper(&update).to_core())
}
