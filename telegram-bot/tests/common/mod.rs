//! Shared doubles for gateway integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dbot_core::{Bot, BotIdentity, Chat, ChatAction, DbotError, ReplyOptions, Result as DbotResult};
use llm_client::{CompletionRequest, LlmClient};

/// Bot that records sent texts; sends can be switched to fail.
#[derive(Default)]
pub struct RecordingBot {
    sent: Mutex<Vec<String>>,
    pub fail_sends: AtomicBool,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn get_me(&self) -> DbotResult<BotIdentity> {
        Ok(BotIdentity {
            username: Some("gateway_test_bot".to_string()),
        })
    }

    async fn set_webhook(&self, _url: &str) -> DbotResult<()> {
        Ok(())
    }

    async fn delete_webhook(&self) -> DbotResult<()> {
        Ok(())
    }

    async fn send_message(&self, _chat: &Chat, text: &str, _options: &ReplyOptions) -> DbotResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DbotError::Bot("Forbidden: bot was blocked by the user".to_string()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_chat_action(&self, _chat: &Chat, _action: ChatAction) -> DbotResult<()> {
        Ok(())
    }
}

/// LlmClient that answers with fixed text, or fails, and counts calls.
pub struct ScriptedLlm {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("The server had an error while processing your request"),
        }
    }
}

/// Telegram webhook JSON for a private-chat text message.
pub fn message_update(update_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": 100 + update_id,
            "date": 1706529600,
            "chat": {"id": 4242, "type": "private", "first_name": "Ada"},
            "from": {"id": 4242, "is_bot": false, "first_name": "Ada", "username": "ada"},
            "text": text
        }
    })
}
