//! Bot command handlers.

use anyhow::{Result, anyhow};
use voxscribe_core::config::{Config, paths};

pub async fn polling(config: &Config) -> Result<()> {
    log_config_source();
    voxscribe_bot::run_polling(config).await
}

pub async fn serve(config: &Config, port: Option<u16>) -> Result<()> {
    log_config_source();
    voxscribe_bot::run_webhook(config, port).await
}

pub async fn set_webhook(config: &Config) -> Result<()> {
    match voxscribe_bot::set_webhook(config).await {
        Ok(url) => {
            println!("✅ Webhook set successfully!");
            tracing::debug!(%url, "Webhook URL");
            Ok(())
        }
        Err(err) => Err(anyhow!("❌ Failed to set webhook: {err:#}")),
    }
}

fn log_config_source() {
    let config_path = paths::config_path();
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Config file");
    }
}
