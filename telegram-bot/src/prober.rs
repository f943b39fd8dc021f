//! Liveness Prober: periodically GETs the service's own public URL so an idle-sleeping host
//! keeps it awake. No backoff and no stop condition other than process exit.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{error, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct LivenessProber {
    client: Client,
    target: String,
    interval: Duration,
}

impl LivenessProber {
    /// Must be built outside any async runtime (blocking client).
    pub fn new(target: impl Into<String>, interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .context("Failed to build liveness probe client")?;
        Ok(Self {
            client,
            target: target.into(),
            interval,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// One probe: logs and returns the status, or logs and returns the error.
    pub fn probe_once(&self) -> std::result::Result<StatusCode, reqwest::Error> {
        match self.client.get(&self.target).send() {
            Ok(response) => {
                let status = response.status();
                info!(target_url = %self.target, status = status.as_u16(), "Ping response");
                Ok(status)
            }
            Err(e) => {
                error!(target_url = %self.target, error = %e, "Error pinging server");
                Err(e)
            }
        }
    }

    /// Probes forever on the fixed interval.
    pub fn run(&self) {
        loop {
            let _ = self.probe_once();
            thread::sleep(self.interval);
        }
    }

    /// Runs the prober on a dedicated background thread.
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("liveness-prober".to_string())
            .spawn(move || self.run())
            .context("Failed to spawn liveness prober thread")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: a probe hits the target and reports its status.**
    #[test]
    fn test_probe_once_reports_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("Bots are running!")
            .expect(1)
            .create();

        let prober = LivenessProber::new(server.url(), Duration::from_secs(840)).unwrap();
        assert_eq!(prober.probe_once().unwrap(), StatusCode::OK);
        mock.assert();
    }

    /// **Test: a non-2xx answer is still a completed probe, not an error.**
    #[test]
    fn test_probe_once_server_error_status() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/").with_status(503).create();

        let prober = LivenessProber::new(server.url(), Duration::from_secs(840)).unwrap();
        assert_eq!(
            prober.probe_once().unwrap(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    /// **Test: an unreachable target is logged and returned as an error.**
    #[test]
    fn test_probe_once_unreachable() {
        let prober =
            LivenessProber::new("http://127.0.0.1:9/", Duration::from_secs(840)).unwrap();
        assert!(prober.probe_once().is_err());
    }

    /// **Test: the background loop probes repeatedly on its interval.**
    #[test]
    fn test_spawned_prober_repeats() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .expect_at_least(2)
            .create();

        let prober = LivenessProber::new(server.url(), Duration::from_millis(50)).unwrap();
        let _handle = prober.spawn().unwrap();
        thread::sleep(Duration::from_millis(400));
        mock.assert();
    }
}
