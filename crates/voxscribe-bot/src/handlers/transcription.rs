//! Audio message pipeline: acknowledge, fetch, transcribe, edit the acknowledgment.

use anyhow::{Context, Result};

use crate::bot::BotContext;
use crate::commands::CallbackAction;
use crate::failure::{DownloadError, FailureKind};
use crate::telegram::{InlineKeyboardMarkup, TelegramClient};
use crate::texts;
use crate::types::{AttachmentRef, InboundMessage};

/// The "processing" reply that is later edited with the outcome.
#[derive(Debug, Clone, Copy)]
struct Acknowledgment {
    chat_id: i64,
    message_id: i64,
}

pub(crate) async fn handle_unsupported(context: &BotContext, message: &InboundMessage) -> Result<()> {
    let kind = FailureKind::UnsupportedAttachment;
    tracing::info!(chat_id = message.chat_id, "Unsupported file type received");
    context
        .notify(
            &kind.subject(message.sender_name()),
            &format!(
                "User: {} sent an unsupported file type.",
                message.sender_label()
            ),
        )
        .await;
    context
        .client()
        .send_message(message.chat_id, kind.user_text(), None)
        .await?;
    Ok(())
}

/// Transcribes one audio attachment and reports the outcome in the chat.
///
/// Never fails: every error is classified, reported to the operator and
/// answered in the chat.
pub(crate) async fn handle_audio(
    context: &BotContext,
    message: &InboundMessage,
    attachment: &AttachmentRef,
) {
    let mut ack = None;
    if let Err(err) = transcribe_and_reply(context, message, attachment, &mut ack).await {
        report_failure(context, message, ack, &err).await;
    }
}

async fn transcribe_and_reply(
    context: &BotContext,
    message: &InboundMessage,
    attachment: &AttachmentRef,
    ack_slot: &mut Option<Acknowledgment>,
) -> Result<()> {
    let client = context.client();
    let sent = client
        .send_message(message.chat_id, texts::PROCESSING, None)
        .await
        .context("send processing acknowledgment")?;
    let ack = Acknowledgment {
        chat_id: sent.chat.id,
        message_id: sent.message_id,
    };
    *ack_slot = Some(ack);

    let audio = fetch_audio(client, &attachment.file_id)
        .await
        .context(DownloadError)?;
    tracing::debug!(chat_id = ack.chat_id, bytes = audio.len(), "Downloaded audio");

    let text = context.transcriber().transcribe(&audio).await?;

    if text.trim().is_empty() {
        let kind = FailureKind::EmptyTranscript;
        tracing::info!(chat_id = ack.chat_id, "No speech detected");
        context
            .notify(
                &kind.subject(message.sender_name()),
                &format!(
                    "User: {} had a transcription failure with no detectable speech.",
                    message.sender_label()
                ),
            )
            .await;
        return client
            .edit_message_text(ack.chat_id, ack.message_id, kind.user_text(), None)
            .await
            .context("edit acknowledgment with no-speech reply");
    }

    let keyboard = InlineKeyboardMarkup::single_column(&[(
        texts::TRANSCRIBE_ANOTHER_BUTTON,
        CallbackAction::TRANSCRIBE_ANOTHER,
    )]);
    client
        .edit_message_text(
            ack.chat_id,
            ack.message_id,
            &texts::transcribed(&text),
            Some(&keyboard),
        )
        .await
        .context("edit acknowledgment with transcript")?;
    tracing::info!(chat_id = ack.chat_id, chars = text.len(), "Transcript delivered");
    Ok(())
}

async fn fetch_audio(client: &TelegramClient, file_id: &str) -> Result<Vec<u8>> {
    let file = client.get_file(file_id).await?;
    let Some(file_path) = file.file_path else {
        anyhow::bail!("Telegram file has no file_path");
    };
    client.download_file(&file_path).await
}

async fn report_failure(
    context: &BotContext,
    message: &InboundMessage,
    ack: Option<Acknowledgment>,
    err: &anyhow::Error,
) {
    let kind = FailureKind::classify(err);
    tracing::error!(
        chat_id = message.chat_id,
        failure = %kind,
        "Audio handler failed: {err:#}"
    );

    let body = match kind {
        FailureKind::MessageTooLong => format!(
            "Critical error in bot:\nError: {err}\nDetails: {err:#}\nUser: {}",
            message.sender_label()
        ),
        _ => format!(
            "Error: {err}\nDetails: {err:#}\nUser: {}",
            message.sender_label()
        ),
    };
    context
        .notify(&kind.subject(message.sender_name()), &body)
        .await;

    let client = context.client();
    let delivered = match ack {
        Some(ack) if !kind.replies_fresh() => {
            client
                .edit_message_text(ack.chat_id, ack.message_id, kind.user_text(), None)
                .await
        }
        _ => client
            .send_message(message.chat_id, kind.user_text(), None)
            .await
            .map(|_| ()),
    };
    if let Err(reply_err) = delivered {
        tracing::warn!(
            chat_id = message.chat_id,
            "Failed to deliver error reply: {reply_err:#}"
        );
    }
}
