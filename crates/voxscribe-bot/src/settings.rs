//! Runtime settings resolved once at startup from config + environment.

use std::time::Duration;

use anyhow::{Result, bail};
use voxscribe_core::config::Config;

const BOT_TOKEN_ENV: &[&str] = &["VOXSCRIBE_BOT_TOKEN", "BOT_TOKEN"];
const WEBHOOK_URL_ENV: &[&str] = &["VOXSCRIBE_WEBHOOK_URL"];
const PORT_ENV: &[&str] = &["PORT"];
const API_KEY_ENV: &[&str] = &["ASSEMBLYAI_API_KEY", "API_KEY"];
const EMAIL_USER_ENV: &[&str] = &["EMAIL_USER"];
const EMAIL_PASS_ENV: &[&str] = &["EMAIL_PASS"];
const EMAIL_RECIPIENT_ENV: &[&str] = &["EMAIL_RECIPIENT"];
const EMAIL_SERVICE_ENV: &[&str] = &["EMAIL_SERVICE"];

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub bot_token: String,
    pub webhook_url: Option<String>,
    pub port: u16,
    pub transcription: TranscriptionSettings,
    /// `None` disables operator alerts.
    pub email: Option<EmailSettings>,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub speech_model: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub user: String,
    pub password: String,
    pub recipient: String,
    pub smtp_host: String,
}

impl BotSettings {
    /// # Errors
    /// Returns an error if no bot token is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    pub(crate) fn resolve(config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |value: Option<&str>, keys: &[&str]| -> Option<String> {
            normalize_optional(value).or_else(|| {
                keys.iter()
                    .find_map(|key| env(key).as_deref().and_then(normalize_string))
            })
        };

        let Some(bot_token) = lookup(config.telegram.bot_token.as_deref(), BOT_TOKEN_ENV) else {
            bail!("telegram.bot_token or VOXSCRIBE_BOT_TOKEN is required");
        };

        let port = match config.server.port {
            Some(port) => port,
            None => match lookup(None, PORT_ENV) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {raw:?}"))?,
                None => Config::DEFAULT_PORT,
            },
        };

        let transcription = TranscriptionSettings {
            api_key: lookup(config.transcription.api_key.as_deref(), API_KEY_ENV),
            base_url: normalize_optional(config.transcription.base_url.as_deref()),
            speech_model: normalize_string(&config.transcription.speech_model)
                .unwrap_or_else(|| Config::DEFAULT_SPEECH_MODEL.to_string()),
            poll_interval: config.transcription.poll_interval(),
        };

        let email = {
            let user = lookup(config.email.user.as_deref(), EMAIL_USER_ENV);
            let password = lookup(config.email.password.as_deref(), EMAIL_PASS_ENV);
            let recipient = lookup(config.email.recipient.as_deref(), EMAIL_RECIPIENT_ENV);
            let service = lookup(config.email.service.as_deref(), EMAIL_SERVICE_ENV)
                .unwrap_or_else(|| Config::DEFAULT_EMAIL_SERVICE.to_string());
            let smtp_host = normalize_optional(config.email.smtp_host.as_deref())
                .or_else(|| relay_host_for_service(&service).map(str::to_string));
            match (user, password, recipient, smtp_host) {
                (Some(user), Some(password), Some(recipient), Some(smtp_host)) => {
                    Some(EmailSettings {
                        user,
                        password,
                        recipient,
                        smtp_host,
                    })
                }
                _ => None,
            }
        };

        Ok(Self {
            bot_token,
            webhook_url: lookup(config.telegram.webhook_url.as_deref(), WEBHOOK_URL_ENV),
            port,
            transcription,
            email,
        })
    }
}

/// SMTP relay for the mail services operators commonly use.
fn relay_host_for_service(service: &str) -> Option<&'static str> {
    match service.trim().to_ascii_lowercase().as_str() {
        "gmail" | "googlemail" => Some("smtp.gmail.com"),
        "outlook" | "hotmail" => Some("smtp-mail.outlook.com"),
        "yahoo" => Some("smtp.mail.yahoo.com"),
        "icloud" => Some("smtp.mail.me.com"),
        _ => None,
    }
}

fn normalize_optional(input: Option<&str>) -> Option<String> {
    input.and_then(normalize_string)
}

fn normalize_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
