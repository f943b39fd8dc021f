//! Local-development tunnel through the `ngrok` agent.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tokio::process::{Child, Command};
use tracing::{debug, info};

const AGENT_API_URL: &str = "http://127.0.0.1:4040/api/tunnels";
const POLL_ATTEMPTS: usize = 30;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<TunnelInfo>,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
}

/// First `https://` public URL in an agent API `/api/tunnels` response.
fn https_public_url(body: &str) -> Option<String> {
    let list: TunnelList = serde_json::from_str(body).ok()?;
    list.tunnels
        .into_iter()
        .map(|t| t.public_url)
        .find(|url| url.starts_with("https://"))
}

/// A running `ngrok http` process and the public URL it was assigned. The process is killed
/// when this value is dropped.
pub struct NgrokTunnel {
    _child: Child,
    public_url: String,
}

impl NgrokTunnel {
    /// Starts `ngrok http {port}` and waits for the agent to report an https tunnel.
    pub async fn open(port: u16, auth_token: &str) -> Result<Self> {
        let mut child = Command::new("ngrok")
            .args(["http", &port.to_string(), "--authtoken", auth_token, "--log", "stdout"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to start ngrok (is it installed and on PATH?)")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .context("Failed to build ngrok agent client")?;

        for attempt in 1..=POLL_ATTEMPTS {
            if let Some(status) = child.try_wait()? {
                bail!("ngrok exited before opening a tunnel: {}", status);
            }
            match http.get(AGENT_API_URL).send().await {
                Ok(response) => {
                    let body = response.text().await.unwrap_or_default();
                    if let Some(public_url) = https_public_url(&body) {
                        info!(%public_url, "Local development: ngrok tunnel established");
                        return Ok(Self {
                            _child: child,
                            public_url,
                        });
                    }
                }
                Err(e) => debug!(attempt, error = %e, "ngrok agent not ready"),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        bail!("ngrok did not report a public https URL in time")
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }
}
