//! Command-line interface of the `dbot-gateway` binary.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::GatewayConfig;

#[derive(Parser)]
#[command(name = "dbot-gateway")]
#[command(about = "Telegram webhook gateway for the wiki-facts and business-ideas bots", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve webhooks for every configured bot (config from env; flags override it).
    Run {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
        /// Externally reachable base URL (overrides WEBHOOK_URL).
        #[arg(long)]
        webhook_url: Option<String>,
    },
}

/// Loads the environment configuration, applies CLI overrides and validates the result.
pub fn load_config(port: Option<u16>, webhook_url: Option<String>) -> Result<GatewayConfig> {
    let config = GatewayConfig::from_env()?.with_overrides(port, webhook_url);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "dbot-gateway",
            "run",
            "--port",
            "9090",
            "--webhook-url",
            "https://bots.example.com",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Run {
                port: Some(9090),
                webhook_url: Some("https://bots.example.com".to_string()),
            }
        );
    }

    #[test]
    fn test_run_without_flags() {
        let cli = Cli::try_parse_from(["dbot-gateway", "run"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Run {
                port: None,
                webhook_url: None
            }
        );
        assert!(Cli::try_parse_from(["dbot-gateway", "run", "--port", "http"]).is_err());
    }
}
