//! Shared fakes for handler and gateway tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use async_trait::async_trait;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::bot::BotContext;
use crate::notify::Notifier;
use crate::telegram::{TelegramClient, Update};
use crate::transcribe::{SpeechToText, Transcriber};

pub(crate) const TOKEN: &str = "TEST_TOKEN";
pub(crate) const STT_NAME: &str = "FakeSTT";

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
    }
}

/// Speech-to-text fake with a fixed reply.
pub(crate) struct ScriptedStt {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedStt {
    pub(crate) fn text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for ScriptedStt {
    fn name(&self) -> &'static str {
        STT_NAME
    }

    async fn transcribe_file(&self, path: &Path) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "staged audio missing during transcription");
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("{STT_NAME} request failed: {message}"),
        }
    }
}

/// Speech-to-text fake that panics mid-transcription.
pub(crate) struct PanickingStt;

#[async_trait]
impl SpeechToText for PanickingStt {
    fn name(&self) -> &'static str {
        "PanickingSTT"
    }

    async fn transcribe_file(&self, _path: &Path) -> anyhow::Result<String> {
        panic!("decoder exploded");
    }
}

pub(crate) fn context(
    server: &MockServer,
    stt: Arc<dyn SpeechToText>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<BotContext> {
    Arc::new(BotContext::new(
        TelegramClient::with_base_url(TOKEN.to_string(), &server.uri()),
        Transcriber::new(stt),
        notifier,
    ))
}

pub(crate) fn update(value: Value) -> Update {
    serde_json::from_value(value).unwrap()
}

/// A message update from user 7 ("Ada") in chat 100 with the given payload fields.
pub(crate) fn message_update(payload: Value) -> Update {
    let mut message = json!({
        "message_id": 1,
        "chat": {"id": 100, "type": "private"},
        "from": {"id": 7, "is_bot": false, "first_name": "Ada"}
    });
    if let (Some(message), Some(payload)) = (message.as_object_mut(), payload.as_object()) {
        for (key, value) in payload {
            message.insert(key.clone(), value.clone());
        }
    }
    update(json!({"update_id": 1, "message": message}))
}

fn bot_path(method_name: &str) -> String {
    format!("/bot{TOKEN}/{method_name}")
}

/// `sendMessage` echoing the chat id back with message id 500.
pub(crate) async fn mount_send_message(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .respond_with(|request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 500, "chat": {"id": body["chat_id"]}}
            }))
        })
        .mount(server)
        .await;
}

pub(crate) async fn mount_ok(server: &MockServer, method_name: &str) {
    Mock::given(method("POST"))
        .and(path(bot_path(method_name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": true
        })))
        .mount(server)
        .await;
}

pub(crate) async fn mount_api_error(server: &MockServer, method_name: &str, description: &str) {
    Mock::given(method("POST"))
        .and(path(bot_path(method_name)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": description
        })))
        .mount(server)
        .await;
}

/// `getFile` resolving every id to `file_path`, plus the file download itself.
pub(crate) async fn mount_file(server: &MockServer, file_path: &str, status: u16, bytes: &[u8]) {
    Mock::given(method("POST"))
        .and(path(bot_path("getFile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"file_id": "f", "file_path": file_path}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{TOKEN}/{file_path}")))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// JSON bodies of every call made to one Bot API method, in arrival order.
pub(crate) async fn calls_to(server: &MockServer, method_name: &str) -> Vec<Value> {
    let target = bot_path(method_name);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == target)
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
