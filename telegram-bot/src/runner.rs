//! The gateway's process flow: resolve the base URL, start the bots, serve, probe, wait for
//! Ctrl-C, shut down.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, instrument};

use crate::bridge::EventLoopBridge;
use crate::config::{Environment, GatewayConfig};
use crate::lifecycle::{bot_specs, shutdown_all, startup};
use crate::prober::LivenessProber;
use crate::server::{bind, spawn_server, GatewayState};
use crate::tunnel::NgrokTunnel;

/// Externally reachable base URL, and the tunnel backing it in development mode.
#[instrument(skip_all, fields(environment = ?config.environment))]
pub async fn resolve_base_url(config: &GatewayConfig) -> Result<(String, Option<NgrokTunnel>)> {
    match config.environment {
        Environment::Development => {
            let auth_token = config
                .ngrok_auth_token
                .as_deref()
                .context("NGROK_AUTH_TOKEN not found in environment variables")?;
            let tunnel = NgrokTunnel::open(config.port, auth_token)
                .await
                .context("Failed to start ngrok")?;
            Ok((tunnel.public_url().to_string(), Some(tunnel)))
        }
        Environment::Production => {
            let url = config
                .webhook_url
                .clone()
                .context("WEBHOOK_URL not set in environment variables")?;
            Ok((url, None))
        }
    }
}

/// Runs the gateway until Ctrl-C or until the webhook server dies. Blocks the calling thread; must not be called from async code.
pub fn run_gateway(config: GatewayConfig) -> Result<()> {
    let bridge = Arc::new(EventLoopBridge::new());
    let listener = bind(config.port)?;

    let (base_url, _tunnel) = bridge.run_to_completion(resolve_base_url(&config))??;
    info!(%base_url, port = config.port, "Webhook base URL resolved");

    let specs = bot_specs(&config)?;
    let registry = Arc::new(bridge.run_to_completion(startup(specs, &base_url))??);

    let served = spawn_server(listener, GatewayState::new(registry.clone(), bridge.clone()))
        .and_then(|server| {
            LivenessProber::new(config.server_url.clone(), config.ping_interval)?.spawn()?;
            info!(server_url = %config.server_url, interval = ?config.ping_interval, "Liveness prober started");
            wait_for_stop(server.stopped())
        });
    if let Err(e) = &served {
        error!(error = %e, "Gateway stopped with an error");
    }

    info!("Shutting down...");
    let report = bridge.run_to_completion(shutdown_all(&registry))?;
    if !report.failed.is_empty() {
        error!(failed = ?report.failed, "Some bots did not shut down cleanly");
    }
    bridge.close();
    served
}

/// Blocks until Ctrl-C (`Ok`) or until `server_stopped` resolves (`Err` with its reason).
fn wait_for_stop<F>(server_stopped: F) -> Result<()>
where
    F: Future<Output = anyhow::Error>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;
    runtime.block_on(async {
        tokio::select! {
            biased;
            reason = server_stopped => Err(reason),
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupt received");
                Ok(())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: a stopped server ends the wait with its reason so shutdown can run.**
    #[test]
    fn test_wait_for_stop_returns_when_server_stops() {
        let result = wait_for_stop(async { anyhow::anyhow!("Webhook server failed") });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Webhook server failed"));
    }
}
