//! In-memory doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dbot_core::{Bot, BotIdentity, Chat, ChatAction, DbotError, InboundUpdate, ReplyOptions, Result};

/// Bot that records outgoing calls. Webhook calls can be made to fail.
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<String>>,
    pub webhooks: Mutex<Vec<String>>,
    pub deletes: AtomicUsize,
    pub fail_set_webhook: bool,
    pub fail_delete_webhook: bool,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_delete() -> Arc<Self> {
        Arc::new(Self {
            fail_delete_webhook: true,
            ..Default::default()
        })
    }

    pub fn failing_set() -> Arc<Self> {
        Arc::new(Self {
            fail_set_webhook: true,
            ..Default::default()
        })
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn get_me(&self) -> Result<BotIdentity> {
        Ok(BotIdentity {
            username: Some("recording_bot".to_string()),
        })
    }

    async fn set_webhook(&self, url: &str) -> Result<()> {
        if self.fail_set_webhook {
            return Err(DbotError::Bot("setWebhook refused".to_string()));
        }
        self.webhooks.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete_webhook {
            return Err(DbotError::Bot("deleteWebhook refused".to_string()));
        }
        Ok(())
    }

    async fn send_message(&self, _chat: &Chat, text: &str, _options: &ReplyOptions) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_chat_action(&self, _chat: &Chat, _action: ChatAction) -> Result<()> {
        Ok(())
    }
}

pub fn command_update(text: &str) -> InboundUpdate {
    InboundUpdate {
        update_id: 1,
        message_id: "1".to_string(),
        chat: Chat {
            id: 99,
            chat_type: "private".to_string(),
        },
        user: None,
        text: Some(text.to_string()),
    }
}
