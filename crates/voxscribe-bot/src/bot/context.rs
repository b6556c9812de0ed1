use std::sync::Arc;

use crate::notify::Notifier;
use crate::telegram::TelegramClient;
use crate::transcribe::Transcriber;

/// Read-only collaborators shared by every update task.
pub(crate) struct BotContext {
    client: TelegramClient,
    transcriber: Transcriber,
    notifier: Arc<dyn Notifier>,
}

impl BotContext {
    pub(crate) fn new(
        client: TelegramClient,
        transcriber: Transcriber,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            transcriber,
            notifier,
        }
    }

    pub(crate) fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub(crate) fn transcriber(&self) -> &Transcriber {
        &self.transcriber
    }

    pub(crate) async fn notify(&self, subject: &str, body: &str) {
        self.notifier.notify(subject, body).await;
    }
}
