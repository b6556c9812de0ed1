use std::any::Any;
use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::bot::BotContext;
use crate::commands::{BotCommand, parse_command};
use crate::handlers::{commands, transcription};
use crate::telegram::Update;
use crate::texts;
use crate::types::{AttachmentRef, InboundCallback, InboundMessage, InboundUpdate, MessageKind};

/// Handler selected for one inbound update.
#[derive(Debug)]
pub(crate) enum Route<'a> {
    Transcribe {
        message: &'a InboundMessage,
        attachment: &'a AttachmentRef,
    },
    Unsupported(&'a InboundMessage),
    Command {
        message: &'a InboundMessage,
        command: BotCommand,
    },
    OnlyAudio(&'a InboundMessage),
    Callback(&'a InboundCallback),
    Ignore,
}

pub(crate) fn select_route(update: &InboundUpdate) -> Route<'_> {
    match update {
        InboundUpdate::Message(message) => {
            if let Some(attachment) = message.kind.audio_attachment() {
                return Route::Transcribe {
                    message,
                    attachment,
                };
            }
            match &message.kind {
                MessageKind::Document { .. } => Route::Unsupported(message),
                MessageKind::Text(text) => match parse_command(text) {
                    Some(command) => Route::Command { message, command },
                    None => Route::OnlyAudio(message),
                },
                _ => Route::OnlyAudio(message),
            }
        }
        InboundUpdate::Callback(callback) => Route::Callback(callback),
        InboundUpdate::Unhandled => Route::Ignore,
    }
}

/// Runs one update to completion on its own task.
///
/// Errors and panics from any handler end up here: they are logged, reported to
/// the operator and answered with the generic error text when a chat is known.
/// Returns an error only when a handler panicked.
pub(crate) async fn process_update(context: Arc<BotContext>, update: Update) -> Result<()> {
    let inbound = InboundUpdate::from_update(&update);
    let update_id = update.update_id;

    let task_context = Arc::clone(&context);
    let task_inbound = inbound.clone();
    let outcome = tokio::spawn(async move { dispatch(&task_context, &task_inbound).await }).await;

    let (detail, panicked) = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => (format!("{err:#}"), false),
        Err(join_err) if join_err.is_panic() => {
            let payload = join_err.into_panic();
            (format!("panic: {}", panic_message(&*payload)), true)
        }
        Err(join_err) => (join_err.to_string(), false),
    };

    report_global_failure(&context, &inbound, update_id, &detail).await;
    if panicked {
        return Err(anyhow!("Handler panicked on update {update_id}: {detail}"));
    }
    Ok(())
}

async fn dispatch(context: &BotContext, update: &InboundUpdate) -> Result<()> {
    match select_route(update) {
        Route::Transcribe {
            message,
            attachment,
        } => {
            transcription::handle_audio(context, message, attachment).await;
            Ok(())
        }
        Route::Unsupported(message) => transcription::handle_unsupported(context, message).await,
        Route::Command { message, command } => {
            commands::handle_command(context, message, command).await
        }
        Route::OnlyAudio(message) => commands::handle_only_audio(context, message).await,
        Route::Callback(callback) => commands::handle_callback(context, callback).await,
        Route::Ignore => {
            tracing::debug!("Ignoring update without message or callback query");
            Ok(())
        }
    }
}

async fn report_global_failure(
    context: &BotContext,
    update: &InboundUpdate,
    update_id: i64,
    detail: &str,
) {
    let kind = update.kind_name();
    tracing::error!(update_id, kind, "Global error: {detail}");

    let sender = update
        .sender_id()
        .map_or_else(|| "N/A".to_string(), |id| id.to_string());
    let subject = format!("GLOBAL CRITICAL ERROR: {kind} update");
    let body = format!("Error: {detail}\nUpdate Type: {kind}\nUser: {sender}");
    context.notify(&subject, &body).await;

    if let Some(chat_id) = update.chat_id()
        && let Err(err) = context
            .client()
            .send_message(chat_id, texts::UNKNOWN_ERROR, None)
            .await
    {
        tracing::warn!(update_id, chat_id, "Failed to send error reply: {err:#}");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::MockServer;

    use super::*;
    use crate::test_support::{
        PanickingStt, RecordingNotifier, ScriptedStt, calls_to, context, message_update,
        mount_api_error, mount_file, mount_send_message, update,
    };

    fn route_name(update: &Update) -> &'static str {
        let inbound = InboundUpdate::from_update(update);
        match select_route(&inbound) {
            Route::Transcribe { .. } => "transcribe",
            Route::Unsupported(_) => "unsupported",
            Route::Command { .. } => "command",
            Route::OnlyAudio(_) => "only_audio",
            Route::Callback(_) => "callback",
            Route::Ignore => "ignore",
        }
    }

    #[test]
    fn audio_shapes_route_to_transcription() {
        for payload in [
            json!({"voice": {"file_id": "v"}}),
            json!({"audio": {"file_id": "a"}}),
            json!({"video_note": {"file_id": "n"}}),
            json!({"document": {"file_id": "d", "mime_type": "audio/mpeg"}}),
        ] {
            assert_eq!(route_name(&message_update(payload)), "transcribe");
        }
    }

    #[test]
    fn other_shapes_never_route_to_transcription() {
        assert_eq!(
            route_name(&message_update(
                json!({"document": {"file_id": "d", "mime_type": "image/png"}})
            )),
            "unsupported"
        );
        assert_eq!(
            route_name(&message_update(json!({"document": {"file_id": "d"}}))),
            "unsupported"
        );
        assert_eq!(
            route_name(&message_update(json!({"text": "hello"}))),
            "only_audio"
        );
        assert_eq!(
            route_name(&message_update(json!({"sticker": {"file_id": "s"}}))),
            "only_audio"
        );
        assert_eq!(
            route_name(&message_update(json!({"text": "/start"}))),
            "command"
        );
    }

    #[test]
    fn callbacks_and_empty_updates() {
        let callback = update(json!({
            "update_id": 2,
            "callback_query": {"id": "cb", "from": {"id": 7, "is_bot": false}, "data": "HELP"}
        }));
        assert_eq!(route_name(&callback), "callback");
        assert_eq!(route_name(&update(json!({"update_id": 3}))), "ignore");
    }

    #[tokio::test]
    async fn handler_error_is_reported_globally() {
        let server = MockServer::start().await;
        mount_api_error(&server, "sendMessage", "Forbidden: bot was blocked by the user").await;
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(&server, ScriptedStt::text("unused"), notifier.clone());

        process_update(ctx, message_update(json!({"text": "/help"})))
            .await
            .unwrap();

        assert_eq!(
            notifier.subjects(),
            vec!["GLOBAL CRITICAL ERROR: message update".to_string()]
        );
        let (_, body) = &notifier.sent()[0];
        assert!(body.contains("bot was blocked by the user"));
        assert!(body.contains("User: 7"));
        // /help reply, then the generic error reply
        let sent = calls_to(&server, "sendMessage").await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1]["text"], texts::UNKNOWN_ERROR);
    }

    #[tokio::test]
    async fn handler_panic_is_caught_and_surfaced() {
        let server = MockServer::start().await;
        mount_send_message(&server).await;
        mount_file(&server, "voice/a.oga", 200, b"OggS").await;
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(&server, Arc::new(PanickingStt), notifier.clone());

        let err = process_update(ctx, message_update(json!({"voice": {"file_id": "v"}})))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("decoder exploded"));
        assert_eq!(
            notifier.subjects(),
            vec!["GLOBAL CRITICAL ERROR: message update".to_string()]
        );
        let sent = calls_to(&server, "sendMessage").await;
        assert_eq!(sent.last().unwrap()["text"], texts::UNKNOWN_ERROR);
    }

    #[tokio::test]
    async fn updates_without_payload_touch_nothing() {
        let server = MockServer::start().await;
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = context(&server, ScriptedStt::text("unused"), notifier.clone());

        process_update(ctx, update(json!({"update_id": 9})))
            .await
            .unwrap();

        assert!(notifier.sent().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
