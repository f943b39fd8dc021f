//! Bot instances and the token-keyed registry the webhook router reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dbot_core::{Bot, BotToken, DbotError, InboundUpdate, Result};
use handler_chain::{CommandSet, DispatchOutcome, HandlerChain};
use tracing::{info, instrument};

/// Lifecycle of a [`BotApplication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Uninitialized,
    Initialized,
    ShutDown,
}

#[derive(Debug)]
struct Lifecycle {
    state: BotState,
    username: Option<String>,
}

/// One bot: its token, platform client and command handlers.
pub struct BotApplication {
    name: String,
    token: BotToken,
    bot: Arc<dyn Bot>,
    chain: HandlerChain,
    lifecycle: Mutex<Lifecycle>,
}

impl BotApplication {
    pub fn new(name: impl Into<String>, token: BotToken, bot: Arc<dyn Bot>, chain: HandlerChain) -> Self {
        Self {
            name: name.into(),
            token,
            bot,
            chain,
            lifecycle: Mutex::new(Lifecycle {
                state: BotState::Uninitialized,
                username: None,
            }),
        }
    }

    /// Builds the instance with a fresh handler chain populated by `commands`.
    pub fn from_command_set(token: BotToken, bot: Arc<dyn Bot>, commands: &dyn CommandSet) -> Self {
        let chain = commands.register(HandlerChain::new());
        Self::new(commands.name(), token, bot, chain)
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &BotToken {
        &self.token
    }

    pub fn state(&self) -> BotState {
        self.lifecycle().state
    }

    /// Username learned from `getMe` during [`BotApplication::initialize`].
    pub fn username(&self) -> Option<String> {
        self.lifecycle().username.clone()
    }

    pub fn commands(&self) -> Vec<&str> {
        self.chain.commands()
    }

    /// Asks the platform who this bot is and marks the instance ready. Calling it again on an
    /// initialized instance refreshes the username.
    #[instrument(skip(self), fields(bot = %self.name, token = %self.token.masked()))]
    pub async fn initialize(&self) -> Result<()> {
        if self.state() == BotState::ShutDown {
            return Err(DbotError::Bot(format!("{} is shut down", self.name)));
        }
        let me = self.bot.get_me().await?;
        let mut lifecycle = self.lifecycle();
        lifecycle.username = me.username;
        lifecycle.state = BotState::Initialized;
        info!(username = ?lifecycle.username, "Bot initialized");
        Ok(())
    }

    /// `{base_url}/{token}` with any trailing slash of the base removed.
    pub fn webhook_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.token.expose())
    }

    pub async fn register_webhook(&self, base_url: &str) -> Result<()> {
        self.bot.set_webhook(&self.webhook_url(base_url)).await
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        self.bot.delete_webhook().await
    }

    /// Processes one inbound update through the handler chain.
    #[instrument(skip(self, update), fields(bot = %self.name, update_id = update.update_id))]
    pub async fn process_update(&self, update: InboundUpdate) -> Result<DispatchOutcome> {
        let username = {
            let lifecycle = self.lifecycle();
            if lifecycle.state != BotState::Initialized {
                return Err(DbotError::NotInitialized(self.name.clone()));
            }
            lifecycle.username.clone()
        };
        self.chain
            .dispatch(update, self.bot.clone(), username.as_deref())
            .await
    }

    /// Releases the instance. Idempotent; updates are rejected afterwards.
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state != BotState::ShutDown {
            lifecycle.state = BotState::ShutDown;
            info!(bot = %self.name, token = %self.token.masked(), "Bot shut down");
        }
    }
}

/// Token → bot instance map. Populated during startup only; shared read-only afterwards.
#[derive(Default)]
pub struct BotRegistry {
    bots: Vec<Arc<BotApplication>>,
    index: HashMap<String, usize>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `app`. A token already present is a configuration error.
    pub fn insert(&mut self, app: BotApplication) -> Result<Arc<BotApplication>> {
        let key = app.token().expose().to_string();
        if self.index.contains_key(&key) {
            return Err(DbotError::Config(format!(
                "Duplicate bot token {}",
                app.token().masked()
            )));
        }
        let app = Arc::new(app);
        self.index.insert(key, self.bots.len());
        self.bots.push(app.clone());
        Ok(app)
    }

    pub fn get(&self, token: &str) -> Option<&Arc<BotApplication>> {
        self.index.get(token).map(|&i| &self.bots[i])
    }

    /// Bots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BotApplication>> {
        self.bots.iter()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
