//! Operator alerts. Delivery is best effort: failures are logged, never returned.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::settings::EmailSettings;

const SUBJECT_PREFIX: &str = "[BOT ERROR]";
const SENDER_NAME: &str = "Voice Transcriber Monitor";

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str);
}

/// Sink used when email alerts are not configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, subject: &str, _body: &str) {
        tracing::debug!(subject, "Email alerts disabled; dropping notification");
    }
}

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// # Errors
    /// Returns an error if an address does not parse or the relay cannot be configured.
    pub fn new(settings: &EmailSettings) -> Result<Self> {
        let sender = settings
            .user
            .parse()
            .with_context(|| format!("Invalid sender address {:?}", settings.user))?;
        let to = settings
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address {:?}", settings.recipient))?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .with_context(|| format!("Failed to configure SMTP relay {}", settings.smtp_host))?
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            mailer,
            from: Mailbox::new(Some(SENDER_NAME.to_string()), sender),
            to,
        })
    }

    fn build(&self, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert_subject(subject))
            .header(ContentType::TEXT_HTML)
            .body(alert_html(&timestamp(), body))
            .context("Failed to build alert email")
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, body: &str) {
        let message = match self.build(subject, body) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(subject, "Failed to send error email: {err:#}");
                return;
            }
        };
        match self.mailer.send(message).await {
            Ok(_) => tracing::info!(subject, "Error email sent"),
            Err(err) => tracing::error!(subject, "Failed to send error email: {err}"),
        }
    }
}

/// Picks the email sink when alerts are configured, else the disabled one.
pub fn notifier_from_settings(email: Option<&EmailSettings>) -> Arc<dyn Notifier> {
    let Some(email) = email else {
        tracing::warn!(
            "Email credentials or recipient missing (EMAIL_USER, EMAIL_PASS, EMAIL_RECIPIENT); error alerts are disabled"
        );
        return Arc::new(DisabledNotifier);
    };
    match EmailNotifier::new(email) {
        Ok(notifier) => {
            tracing::info!(relay = %email.smtp_host, "Email alerts enabled");
            Arc::new(notifier)
        }
        Err(err) => {
            tracing::warn!("Email alerts disabled: {err:#}");
            Arc::new(DisabledNotifier)
        }
    }
}

fn alert_subject(subject: &str) -> String {
    format!("{SUBJECT_PREFIX} {subject}")
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn alert_html(time: &str, body: &str) -> String {
    format!(
        "<p><strong>Time:</strong> {time}</p><hr><p>{}</p>",
        escape_html(body).replace('\n', "<br>")
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            user: "bot@example.com".to_string(),
            password: "secret".to_string(),
            recipient: "ops@example.com".to_string(),
            smtp_host: "smtp.example.com".to_string(),
        }
    }

    #[test]
    fn subject_is_prefixed() {
        assert_eq!(
            alert_subject("Transcription Service Failure"),
            "[BOT ERROR] Transcription Service Failure"
        );
    }

    #[test]
    fn html_body_has_time_and_line_breaks() {
        let html = alert_html("2026-01-02T03:04:05.000Z", "Error: boom\nUser ID: 7 (Ada)");
        assert_eq!(
            html,
            "<p><strong>Time:</strong> 2026-01-02T03:04:05.000Z</p><hr>\
             <p>Error: boom<br>User ID: 7 (Ada)</p>"
        );
    }

    #[test]
    fn html_body_escapes_markup() {
        let html = alert_html("t", "<script> & more");
        assert!(html.contains("&lt;script&gt; &amp; more"));
    }

    #[test]
    fn built_message_carries_sender_name_and_subject() {
        let notifier = EmailNotifier::new(&settings()).unwrap();
        let message = notifier.build("Critical Bot Error", "detail").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: [BOT ERROR] Critical Bot Error"));
        assert!(raw.contains("Voice Transcriber Monitor"));
        assert!(raw.contains("<bot@example.com>"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[test]
    fn invalid_sender_address_is_rejected() {
        let mut settings = settings();
        settings.user = "not an address".to_string();
        assert!(EmailNotifier::new(&settings).is_err());
    }

    #[tokio::test]
    async fn disabled_notifier_is_a_no_op() {
        let notifier = notifier_from_settings(None);
        notifier.notify("Critical Bot Error", "detail").await;
    }
}
