use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use url::Url;
use voxscribe_core::config::Config;

use crate::bot::BotContext;
use crate::notify::notifier_from_settings;
use crate::settings::BotSettings;
use crate::telegram::TelegramClient;
use crate::transcribe::{AssemblyAiProvider, Transcriber};

mod bot;
mod commands;
mod failure;
mod gateway;
mod handlers;
mod notify;
mod settings;
mod telegram;
#[cfg(test)]
mod test_support;
mod texts;
mod transcribe;
mod types;

/// Runs the bot in long-polling mode until SIGINT/SIGTERM.
///
/// # Errors
/// Fails if settings are incomplete, the webhook cannot be removed or the
/// liveness port cannot be bound.
pub async fn run_polling(config: &Config) -> Result<()> {
    let settings = BotSettings::from_config(config)?;
    let port = settings.port;
    let context = build_context(&settings);
    gateway::polling::run(context, port).await
}

/// Serves the webhook endpoint until SIGINT/SIGTERM.
///
/// # Errors
/// Fails if settings are incomplete or the port cannot be bound.
pub async fn run_webhook(config: &Config, port_override: Option<u16>) -> Result<()> {
    let settings = BotSettings::from_config(config)?;
    let port = port_override.unwrap_or(settings.port);
    let context = build_context(&settings);
    gateway::webhook::run(context, port).await
}

/// Registers the configured webhook URL with Telegram and returns it.
///
/// # Errors
/// Fails if the URL is missing or invalid, or Telegram rejects it.
pub async fn set_webhook(config: &Config) -> Result<String> {
    let settings = BotSettings::from_config(config)?;
    let url = webhook_url(settings.webhook_url.as_deref())?;
    TelegramClient::new(settings.bot_token)
        .set_webhook(url.as_str())
        .await?;
    tracing::info!(url = %url, "Webhook registered");
    Ok(url.into())
}

fn webhook_url(raw: Option<&str>) -> Result<Url> {
    let raw = raw.ok_or_else(|| anyhow!("telegram.webhook_url or VOXSCRIBE_WEBHOOK_URL is required"))?;
    let url = Url::parse(raw).with_context(|| format!("Invalid webhook URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Webhook URL must use http or https, got {}", url.scheme());
    }
    Ok(url)
}

fn build_context(settings: &BotSettings) -> Arc<BotContext> {
    let transcription = &settings.transcription;
    if transcription.api_key.is_none() {
        tracing::warn!(
            "transcription.api_key or ASSEMBLYAI_API_KEY is not set; audio messages will fail"
        );
    }
    let provider = AssemblyAiProvider::new(
        transcription.api_key.clone(),
        transcription.base_url.as_deref(),
        &transcription.speech_model,
        transcription.poll_interval,
    );

    Arc::new(BotContext::new(
        TelegramClient::new(settings.bot_token.clone()),
        Transcriber::new(Arc::new(provider)),
        notifier_from_settings(settings.email.as_ref()),
    ))
}
