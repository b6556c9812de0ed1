use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;

use crate::bot::{BotContext, process_update};
use crate::gateway::{register_commands, shutdown_signal};

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(1);
const LIVENESS_TEXT: &str = "Voice Transcriber Bot is running.";

fn liveness_router() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_TEXT }))
}

/// Long-polls Telegram until SIGINT/SIGTERM, one task per update.
///
/// A liveness endpoint is served on `port` for the lifetime of the loop.
pub(crate) async fn run(context: Arc<BotContext>, port: u16) -> Result<()> {
    let client = context.client();
    client
        .delete_webhook()
        .await
        .context("Failed to delete webhook before polling")?;
    register_commands(client).await;

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind liveness server on port {port}"))?;
    tracing::info!(port, "Liveness server listening");
    let liveness = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, liveness_router()).await {
            tracing::error!("Liveness server failed: {err}");
        }
    });

    tracing::info!("Voice Transcriber Bot is running. Polling for updates...");
    poll_updates(context, shutdown_signal()).await;
    liveness.abort();
    Ok(())
}

/// Fetches and dispatches updates until `shutdown` resolves, then drains
/// in-flight handlers and confirms the last offset with Telegram.
pub(crate) async fn poll_updates(context: Arc<BotContext>, shutdown: impl Future<Output = ()>) {
    let client = context.client().clone();
    let tracker = TaskTracker::new();
    let mut offset: Option<i64> = None;
    tokio::pin!(shutdown);

    loop {
        let polled = tokio::select! {
            () = &mut shutdown => break,
            polled = client.get_updates(offset, POLL_TIMEOUT) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(err) => {
                tracing::warn!("Telegram polling error: {err:#}");
                tokio::select! {
                    () = &mut shutdown => break,
                    () = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        if !updates.is_empty() {
            tracing::debug!(count = updates.len(), "Received updates");
        }
        for update in updates {
            offset = Some(update.update_id + 1);
            let context = Arc::clone(&context);
            tracker.spawn(async move {
                if let Err(err) = process_update(context, update).await {
                    tracing::error!("{err:#}");
                }
            });
        }
    }

    tracing::info!("Shutting down Telegram bot");
    tracker.close();
    if !tracker.is_empty() {
        tracing::info!(in_flight = tracker.len(), "Waiting for in-flight updates");
    }
    tracker.wait().await;

    if let Some(offset) = offset
        && let Err(err) = client.confirm_updates(offset).await
    {
        tracing::warn!("Failed to confirm update offset {offset}: {err:#}");
    }
}
