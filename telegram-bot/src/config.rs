//! Gateway configuration, loaded from the environment (after `.env`) and validated before
//! anything is started.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dbot_core::BotToken;
use dbot_telegram::TelegramConfig;
use llm_client::EnvLlmConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 840;
pub const DEFAULT_WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";

/// Where the process runs. Development mode opens an ngrok tunnel for the webhook base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// `development` (any case) selects development mode; anything else is production.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("development") {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub wiki_facts_token: BotToken,
    pub business_ideas_token: BotToken,
    pub environment: Environment,
    /// Externally reachable base URL; webhooks are registered at `{webhook_url}/{token}`.
    pub webhook_url: Option<String>,
    pub ngrok_auth_token: Option<String>,
    pub port: u16,
    /// Target of the liveness prober.
    pub server_url: String,
    pub ping_interval: Duration,
    pub wikipedia_base_url: String,
    pub telegram: TelegramConfig,
    pub llm: EnvLlmConfig,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("wiki_facts_token", &self.wiki_facts_token)
            .field("business_ideas_token", &self.business_ideas_token)
            .field("environment", &self.environment)
            .field("webhook_url", &self.webhook_url)
            .field("ngrok_auth_token", &self.ngrok_auth_token.as_ref().map(|_| "***"))
            .field("port", &self.port)
            .field("server_url", &self.server_url)
            .field("ping_interval", &self.ping_interval)
            .field("wikipedia_base_url", &self.wikipedia_base_url)
            .field("telegram", &self.telegram)
            .field("llm", &self.llm)
            .finish()
    }
}

fn required(name: &str) -> Result<String> {
    optional(name).with_context(|| format!("{} not set", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is not valid ({}): {}", name, raw, e)),
        None => Ok(default),
    }
}

impl GatewayConfig {
    /// Reads every setting. Missing bot tokens or OpenAI key are errors here; cross-field rules
    /// are checked by [`GatewayConfig::validate`] so CLI overrides can be applied in between.
    pub fn from_env() -> Result<Self> {
        let wiki_facts_token = BotToken::new(required("WIKI_FACTS_TELE_TOKEN")?);
        let business_ideas_token = BotToken::new(required("BUSINESS_IDEAS_TELE_TOKEN")?);
        let environment = optional("ENVIRONMENT")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Production);
        let ping_interval =
            Duration::from_secs(parsed("PING_INTERVAL_SECS", DEFAULT_PING_INTERVAL_SECS)?);

        Ok(Self {
            wiki_facts_token,
            business_ideas_token,
            environment,
            webhook_url: optional("WEBHOOK_URL"),
            ngrok_auth_token: optional("NGROK_AUTH_TOKEN"),
            port: parsed("PORT", DEFAULT_PORT)?,
            server_url: optional("SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            ping_interval,
            wikipedia_base_url: optional("WIKIPEDIA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WIKIPEDIA_BASE_URL.to_string()),
            telegram: TelegramConfig::from_env(),
            llm: EnvLlmConfig::from_env()?,
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, port: Option<u16>, webhook_url: Option<String>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(url) = webhook_url.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.wiki_facts_token.is_empty() || self.business_ideas_token.is_empty() {
            bail!("Missing bot tokens in environment variables");
        }
        if self.wiki_facts_token == self.business_ideas_token {
            bail!("WIKI_FACTS_TELE_TOKEN and BUSINESS_IDEAS_TELE_TOKEN must differ");
        }
        match self.environment {
            Environment::Production if self.webhook_url.is_none() => {
                bail!("WEBHOOK_URL not set in environment variables")
            }
            Environment::Development if self.ngrok_auth_token.is_none() => {
                bail!("NGROK_AUTH_TOKEN not found in environment variables")
            }
            _ => {}
        }
        if let Some(url) = &self.webhook_url {
            reqwest::Url::parse(url).with_context(|| format!("WEBHOOK_URL is not a valid URL: {}", url))?;
        }
        if self.ping_interval.is_zero() {
            bail!("PING_INTERVAL_SECS must be greater than zero");
        }
        self.telegram.validate()?;
        Ok(())
    }
}
