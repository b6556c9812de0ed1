use anyhow::Result;

use crate::bot::BotContext;
use crate::commands::{BotCommand, CallbackAction};
use crate::telegram::InlineKeyboardMarkup;
use crate::texts;
use crate::types::{InboundCallback, InboundMessage};

pub(crate) async fn handle_command(
    context: &BotContext,
    message: &InboundMessage,
    command: BotCommand,
) -> Result<()> {
    tracing::info!(chat_id = message.chat_id, ?command, "Command received");
    let client = context.client();
    match command {
        BotCommand::Start => {
            let first_name = message
                .sender
                .as_ref()
                .and_then(|sender| sender.first_name.as_deref());
            let keyboard = InlineKeyboardMarkup::single_column(&[
                (texts::HELP_BUTTON, CallbackAction::HELP),
                (texts::ABOUT_BUTTON, CallbackAction::ABOUT),
            ]);
            client
                .send_message(message.chat_id, &texts::welcome(first_name), Some(&keyboard))
                .await?;
        }
        BotCommand::Help => {
            client.send_message(message.chat_id, texts::HELP, None).await?;
        }
        BotCommand::About => {
            client.send_message(message.chat_id, texts::ABOUT, None).await?;
        }
    }
    Ok(())
}

pub(crate) async fn handle_callback(context: &BotContext, callback: &InboundCallback) -> Result<()> {
    let client = context.client();
    if let Err(err) = client.answer_callback_query(&callback.id).await {
        tracing::warn!(callback_id = %callback.id, "Failed to answer callback query: {err:#}");
    }

    let Some(action) = callback.data.as_deref().and_then(CallbackAction::parse) else {
        tracing::debug!(data = ?callback.data, "Ignoring unknown callback data");
        return Ok(());
    };
    let Some(chat_id) = callback.chat_id else {
        tracing::debug!(?action, "Callback without a chat; nothing to reply to");
        return Ok(());
    };

    let text = match action {
        CallbackAction::Help | CallbackAction::TranscribeAnother => texts::HELP,
        CallbackAction::About => texts::ABOUT,
    };
    client.send_message(chat_id, text, None).await?;
    Ok(())
}

/// Fallback for messages that carry no audio.
pub(crate) async fn handle_only_audio(context: &BotContext, message: &InboundMessage) -> Result<()> {
    context
        .client()
        .send_message(message.chat_id, texts::ONLY_AUDIO, None)
        .await?;
    Ok(())
}
