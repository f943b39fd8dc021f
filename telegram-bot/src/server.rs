//! Webhook Router: `POST /{token}` for bot updates, `GET /` for liveness.
//!
//! Request handlers are async (axum), the per-update work goes through the Event Loop Bridge
//! from the blocking pool so every bot's processing shares one execution context.

use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use dbot_core::BotToken;
use handler_chain::DispatchOutcome;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::bridge::EventLoopBridge;
use crate::registry::BotRegistry;

pub const LIVENESS_BODY: &str = "Bots are running!";
pub const ACK_BODY: &str = "OK";
pub const INVALID_TOKEN_BODY: &str = "Invalid token";
pub const PROCESSING_ERROR_BODY: &str = "Error processing update";

/// Shared by every request.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<BotRegistry>,
    pub bridge: Arc<EventLoopBridge>,
}

impl GatewayState {
    pub fn new(registry: Arc<BotRegistry>, bridge: Arc<EventLoopBridge>) -> Self {
        Self { registry, bridge }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/{token}", post(receive_update))
        .with_state(state)
}

async fn liveness() -> &'static str {
    LIVENESS_BODY
}

async fn receive_update(
    State(state): State<GatewayState>,
    Path(token): Path<String>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let Some(app) = state.registry.get(&token).cloned() else {
        warn!(token = %BotToken::new(token).masked(), "Update for unknown bot token");
        return (StatusCode::BAD_REQUEST, INVALID_TOKEN_BODY);
    };

    let update = match dbot_telegram::parse_update(&body) {
        Ok(Some(update)) => update,
        Ok(None) => {
            debug!(bot = %app.name(), "Update carries no message, ignored");
            return (StatusCode::OK, ACK_BODY);
        }
        Err(e) => {
            error!(bot = %app.name(), error = %e, "Error processing webhook");
            return (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_BODY);
        }
    };

    let bridge = state.bridge.clone();
    let worker = app.clone();
    let processed = tokio::task::spawn_blocking(move || {
        bridge.run_to_completion(async move { worker.process_update(update).await })
    })
    .await;

    let outcome = match processed {
        Ok(Ok(Ok(outcome))) => Ok(outcome),
        Ok(Ok(Err(e))) => Err(anyhow::Error::from(e)),
        Ok(Err(e)) => Err(e),
        Err(join) => Err(anyhow::Error::from(join)),
    };

    match outcome {
        Ok(DispatchOutcome::Replied { command, fallback }) => {
            info!(bot = %app.name(), command = %command, fallback, "Update processed");
            (StatusCode::OK, ACK_BODY)
        }
        Ok(DispatchOutcome::Ignored) => (StatusCode::OK, ACK_BODY),
        Err(e) => {
            error!(bot = %app.name(), error = %e, "Error processing webhook");
            (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_BODY)
        }
    }
}

/// Binds the listen socket on the calling thread so a taken port fails before any bot starts.
pub fn bind(port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("Failed to bind port {}", port))?;
    listener
        .set_nonblocking(true)
        .context("Failed to make listener non-blocking")?;
    Ok(listener)
}

/// A webhook server running on its own thread.
pub struct ServerHandle {
    thread: JoinHandle<()>,
    stopped: oneshot::Receiver<anyhow::Error>,
}

impl ServerHandle {
    /// Resolves once the server has stopped serving, with the reason. A server thread that
    /// died without reporting (a panic) resolves too.
    pub async fn stopped(self) -> anyhow::Error {
        let reason = match self.stopped.await {
            Ok(reason) => reason,
            Err(_) => anyhow!("Webhook server thread exited without reporting"),
        };
        if self.thread.is_finished() {
            let _ = self.thread.join();
        }
        reason
    }
}

/// Serves the router on a background thread with its own multi-thread runtime.
pub fn spawn_server(listener: TcpListener, state: GatewayState) -> Result<ServerHandle> {
    let addr = listener.local_addr()?;
    let (report, stopped) = oneshot::channel();
    let thread = thread::Builder::new()
        .name("webhook-server".to_string())
        .spawn(move || {
            let reason = serve_until_stopped(listener, addr, state);
            error!(error = %reason, "Webhook server stopped");
            let _ = report.send(reason);
        })
        .context("Failed to spawn webhook server thread")?;
    Ok(ServerHandle { thread, stopped })
}

fn serve_until_stopped(
    listener: TcpListener,
    addr: std::net::SocketAddr,
    state: GatewayState,
) -> anyhow::Error {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return anyhow::Error::from(e).context("Failed to build server runtime"),
    };
    let served = runtime.block_on(async move {
        let listener = tokio::net::TcpListener::from_std(listener)?;
        info!(%addr, "Webhook server listening");
        axum::serve(listener, router(state)).await
    });
    match served {
        Ok(()) => anyhow!("Webhook server exited"),
        Err(e) => anyhow::Error::from(e).context("Webhook server failed"),
    }
}
