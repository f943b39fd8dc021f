//! # telegram-bot
//!
//! Multi-bot Telegram webhook gateway. One HTTP server receives webhook callbacks for every bot
//! at `POST /{token}`, looks the bot up in the [`BotRegistry`] and drives its handler chain to
//! completion on the shared execution context of the [`EventLoopBridge`]. The
//! [`LivenessProber`] keeps the host awake; [`lifecycle`] registers and removes webhooks.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod prober;
pub mod registry;
pub mod runner;
pub mod server;
pub mod tunnel;

#[cfg(test)]
mod testing;

pub use bridge::{EventLoopBridge, ExecutionContext};
pub use cli::{load_config, Cli, Commands};
pub use config::{Environment, GatewayConfig};
pub use lifecycle::{bot_specs, shutdown_all, startup, BotSpec, ShutdownReport};
pub use prober::LivenessProber;
pub use registry::{BotApplication, BotRegistry, BotState};
pub use runner::{resolve_base_url, run_gateway};
pub use server::{bind, router, spawn_server, GatewayState, ServerHandle};
pub use tunnel::NgrokTunnel;
