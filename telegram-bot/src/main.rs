//! `dbot-gateway`: serves both bots' webhooks from one process.

use anyhow::Result;
use clap::Parser;
use telegram_bot::{load_config, run_gateway, Cli, Commands};
use tracing::error;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_file = std::env::var("LOG_FILE").ok().filter(|p| !p.trim().is_empty());
    dbot_core::init_tracing(log_file.as_deref())?;

    match cli.command {
        Commands::Run { port, webhook_url } => {
            let config = load_config(port, webhook_url).inspect_err(|e| {
                error!(error = %e, "Invalid configuration");
            })?;
            run_gateway(config)
        }
    }
}
