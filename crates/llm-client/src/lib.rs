//! # LLM client abstraction
//!
//! The Content Provider seen by bot handlers: [`LlmClient::complete`] takes a persona, a task
//! prompt and output limits and returns generated text or fails. [`OpenAILlmClient`] is the
//! production implementation; tests substitute their own.

use anyhow::Result;
use async_trait::async_trait;

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig};
pub use openai_llm::OpenAILlmClient;

/// One generation request: a system persona plus the user-side task prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text-generation service interface.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the generated text for `request`. Empty output is reported as an error.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
