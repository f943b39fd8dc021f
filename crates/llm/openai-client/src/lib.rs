//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for single-shot chat completion with explicit output
//! limits. Provides token masking for safe logging.

use async_openai::{config::OpenAIConfig, types::CreateChatCompletionRequestArgs, Client};
use std::sync::Arc;
use tracing;

pub use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Sampling limits for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// OpenAI chat client. Wraps async-openai client; holds the API key only for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    api_key_for_logging: Option<String>,
}

impl OpenAIClient {
    fn from_openai_config(api_key: String, config: OpenAIConfig) -> Self {
        Self {
            client: Arc::new(Client::with_config(config.with_api_key(api_key.clone()))),
            api_key_for_logging: Some(api_key),
        }
    }

    /// Client for the default OpenAI endpoint.
    pub fn new(api_key: String) -> Self {
        Self::from_openai_config(api_key, OpenAIConfig::new())
    }

    /// Client for an OpenAI-compatible endpoint at `base_url` (proxy, gateway or test double).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self::from_openai_config(api_key, OpenAIConfig::new().with_api_base(base_url))
    }

    /// Sends a chat completion request and returns the first choice's text.
    ///
    /// Logs the masked API key and token usage. An empty choice list is an error.
    #[allow(deprecated)]
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        params: CompletionParams,
    ) -> anyhow::Result<String> {
        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());

        tracing::info!(
            model = %model,
            message_count = messages.len(),
            max_tokens = ?params.max_tokens,
            temperature = ?params.temperature,
            api_key = %masked,
            "OpenAI chat_completion request"
        );

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(model).messages(messages);
        if let Some(max_tokens) = params.max_tokens {
            builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = params.temperature {
            builder.temperature(temperature);
        }
        let request = builder.build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }
}
