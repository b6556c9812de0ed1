use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;

use crate::bot::{BotContext, process_update};
use crate::gateway::{register_commands, shutdown_signal};
use crate::telegram::Update;

const LIVE_TEXT: &str = "Bot is live!";
const OK_TEXT: &str = "OK";
const FAILURE_TEXT: &str = "Something went wrong";

type Reply = (StatusCode, &'static str);

pub(crate) fn router(context: Arc<BotContext>) -> Router {
    Router::new()
        .route(
            "/",
            get(live).post(receive_update).fallback(unsupported_method),
        )
        .with_state(context)
}

/// Serves the webhook endpoint on `port` until SIGINT/SIGTERM.
pub(crate) async fn run(context: Arc<BotContext>, port: u16) -> Result<()> {
    register_commands(context.client()).await;

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind webhook server on port {port}"))?;
    tracing::info!(port, "Webhook server listening");

    axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")
}

async fn live() -> Reply {
    (StatusCode::OK, LIVE_TEXT)
}

/// Answers only after the update has been fully handled.
async fn receive_update(State(context): State<Arc<BotContext>>, body: Bytes) -> Reply {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!("Rejected webhook payload: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_TEXT);
        }
    };

    match process_update(context, update).await {
        Ok(()) => (StatusCode::OK, OK_TEXT),
        Err(err) => {
            tracing::error!("Webhook update failed: {err:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_TEXT)
        }
    }
}

async fn unsupported_method() -> Reply {
    (StatusCode::INTERNAL_SERVER_ERROR, FAILURE_TEXT)
}
