//! Startup and shutdown sequencing for every bot in the gateway.

use std::sync::Arc;

use anyhow::{Context, Result};
use dbot_core::{Bot, BotToken};
use dbot_telegram::TelegramBotAdapter;
use handler_chain::CommandSet;
use llm_client::{LlmClient, OpenAILlmClient};
use llm_handlers::{ArticleSource, BusinessIdeasBot, WikiClient, WikiFactsBot};
use tracing::{error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::registry::{BotApplication, BotRegistry};

/// Everything needed to bring one bot up.
pub struct BotSpec {
    pub token: BotToken,
    pub bot: Arc<dyn Bot>,
    pub commands: Box<dyn CommandSet>,
}

/// Builds the gateway's two bots (wiki facts first, then business ideas) from configuration.
pub fn bot_specs(config: &GatewayConfig) -> Result<Vec<BotSpec>> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAILlmClient::from_config(&config.llm));
    let articles: Arc<dyn ArticleSource> =
        Arc::new(WikiClient::with_base_url(&config.wikipedia_base_url)?);

    let telegram = |token: &BotToken| -> Result<Arc<dyn Bot>> {
        let adapter = TelegramBotAdapter::from_token(token, &config.telegram)
            .with_context(|| format!("Failed to create Telegram client for {}", token.masked()))?;
        Ok(Arc::new(adapter))
    };

    Ok(vec![
        BotSpec {
            token: config.wiki_facts_token.clone(),
            bot: telegram(&config.wiki_facts_token)?,
            commands: Box::new(WikiFactsBot::new(llm.clone(), articles)),
        },
        BotSpec {
            token: config.business_ideas_token.clone(),
            bot: telegram(&config.business_ideas_token)?,
            commands: Box::new(BusinessIdeasBot::new(llm)),
        },
    ])
}

/// Brings every bot up and registers its webhook at `{base_url}/{token}`.
///
/// Per bot: build the instance with its commands, initialize it, insert it into the registry,
/// then register the webhook. Any failure aborts startup after shutting down the bots that were
/// already registered.
#[instrument(skip_all, fields(bots = specs.len()))]
pub async fn startup(specs: Vec<BotSpec>, base_url: &str) -> Result<BotRegistry> {
    let mut registry = BotRegistry::new();
    for spec in specs {
        if let Err(e) = start_bot(&mut registry, spec, base_url).await {
            error!(error = %e, "Startup failed, shutting down registered bots");
            shutdown_all(&registry).await;
            return Err(e);
        }
    }
    info!(bots = registry.len(), "All bots started");
    Ok(registry)
}

async fn start_bot(registry: &mut BotRegistry, spec: BotSpec, base_url: &str) -> Result<()> {
    let app = BotApplication::from_command_set(spec.token, spec.bot, spec.commands.as_ref());
    let name = app.name().to_string();
    let masked = app.token().masked();
    info!(bot = %name, token = %masked, commands = ?app.commands(), "Starting bot");

    app.initialize()
        .await
        .with_context(|| format!("Failed to initialize {}", name))?;
    let app = registry.insert(app)?;
    app.register_webhook(base_url)
        .await
        .with_context(|| format!("Failed to set webhook for {}", name))?;
    info!(bot = %name, token = %masked, "Webhook set up");
    Ok(())
}

/// What [`shutdown_all`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Bots for which shutdown was attempted, in registration order.
    pub attempted: Vec<String>,
    /// Bots with at least one failed step.
    pub failed: Vec<String>,
}

/// Deregisters every bot's webhook, then shuts the bot down. A failing step is logged and the
/// remaining bots are still processed.
#[instrument(skip_all, fields(bots = registry.len()))]
pub async fn shutdown_all(registry: &BotRegistry) -> ShutdownReport {
    let mut report = ShutdownReport::default();
    for app in registry.iter() {
        let masked = app.token().masked();
        report.attempted.push(app.name().to_string());
        match app.delete_webhook().await {
            Ok(()) => info!(bot = %app.name(), token = %masked, "Removed webhook"),
            Err(e) => {
                warn!(bot = %app.name(), token = %masked, error = %e, "Error removing webhook");
                report.failed.push(app.name().to_string());
            }
        }
        app.shutdown();
    }
    info!(
        attempted = report.attempted.len(),
        failed = report.failed.len(),
        "Shutdown complete"
    );
    report
}
