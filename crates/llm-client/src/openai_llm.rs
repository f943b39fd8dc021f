//! OpenAI implementation of LlmClient: system persona + user prompt, one chat completion.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CompletionParams,
};
use tracing::instrument;

use super::{CompletionRequest, LlmClient, LlmConfig};

/// LlmClient backed by openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::new(api_key),
            model: "gpt-3.5-turbo".to_string(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            model: "gpt-3.5-turbo".to_string(),
        }
    }

    pub fn from_config(config: &dyn LlmConfig) -> Self {
        Self::with_base_url(config.api_key().to_string(), config.base_url().to_string())
            .with_model(config.model().to_string())
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_messages(request: &CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
    Ok(vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system.clone())
            .build()?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.clone())
            .build()?
            .into(),
    ])
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let messages = to_messages(&request)?;
        let params = CompletionParams {
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };
        let text = self
            .client
            .chat_completion(&self.model, messages, params)
            .await?;
        if text.trim().is_empty() {
            anyhow::bail!("OpenAI returned an empty completion");
        }
        Ok(text)
    }
}
