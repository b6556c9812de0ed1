//! Inbound gateways: long polling or an HTTP webhook endpoint.

pub(crate) mod polling;
pub(crate) mod webhook;

use crate::commands::telegram_command_specs;
use crate::telegram::TelegramClient;

/// Publishes the command menu. Failure only costs the menu, so it is logged.
pub(crate) async fn register_commands(client: &TelegramClient) {
    match client.set_my_commands(&telegram_command_specs()).await {
        Ok(()) => tracing::debug!("Bot command menu registered"),
        Err(err) => tracing::warn!("Failed to register bot commands: {err:#}"),
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
