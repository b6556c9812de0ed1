//! Inbound updates, classified once at ingestion.

use crate::telegram::{CallbackQuery, Message, Update, User};

const AUDIO_MIME_PREFIX: &str = "audio/";
const UNKNOWN_USER: &str = "Unknown User";

/// Opaque platform handle for a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttachmentRef {
    pub file_id: String,
}

impl AttachmentRef {
    fn new(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sender {
    pub id: i64,
    pub first_name: Option<String>,
}

impl Sender {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_USER)
    }
}

/// Message shape. Variants are checked in priority order:
/// voice, audio, video note, document, text, anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Voice(AttachmentRef),
    Audio(AttachmentRef),
    VideoNote(AttachmentRef),
    Document {
        attachment: AttachmentRef,
        mime_type: Option<String>,
    },
    Text(String),
    Other,
}

impl MessageKind {
    fn of(message: &Message) -> Self {
        if let Some(voice) = message.voice.as_ref() {
            Self::Voice(AttachmentRef::new(&voice.file_id))
        } else if let Some(audio) = message.audio.as_ref() {
            Self::Audio(AttachmentRef::new(&audio.file_id))
        } else if let Some(video_note) = message.video_note.as_ref() {
            Self::VideoNote(AttachmentRef::new(&video_note.file_id))
        } else if let Some(document) = message.document.as_ref() {
            Self::Document {
                attachment: AttachmentRef::new(&document.file_id),
                mime_type: document.mime_type.clone(),
            }
        } else if let Some(text) = message.text.as_ref() {
            Self::Text(text.clone())
        } else {
            Self::Other
        }
    }

    /// The attachment to transcribe, if this shape carries playable audio.
    pub fn audio_attachment(&self) -> Option<&AttachmentRef> {
        match self {
            Self::Voice(attachment) | Self::Audio(attachment) | Self::VideoNote(attachment) => {
                Some(attachment)
            }
            Self::Document {
                attachment,
                mime_type: Some(mime),
            } if mime.starts_with(AUDIO_MIME_PREFIX) => Some(attachment),
            Self::Document { .. } | Self::Text(_) | Self::Other => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InboundMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender: Option<Sender>,
    pub kind: MessageKind,
}

impl InboundMessage {
    pub fn from_message(message: &Message) -> Self {
        Self {
            chat_id: message.chat.id,
            message_id: message.message_id,
            sender: message.from.as_ref().map(Sender::from_user),
            kind: MessageKind::of(message),
        }
    }

    pub fn sender_id(&self) -> Option<i64> {
        self.sender.as_ref().map(|sender| sender.id)
    }

    pub fn sender_name(&self) -> &str {
        self.sender.as_ref().map_or(UNKNOWN_USER, Sender::display_name)
    }

    /// `"<id> (<name>)"` label used in operator alerts.
    pub fn sender_label(&self) -> String {
        match self.sender_id() {
            Some(id) => format!("{id} ({})", self.sender_name()),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InboundCallback {
    pub id: String,
    pub chat_id: Option<i64>,
    pub sender: Sender,
    pub data: Option<String>,
}

impl InboundCallback {
    fn from_query(query: &CallbackQuery) -> Self {
        Self {
            id: query.id.clone(),
            chat_id: query.message.as_ref().map(|message| message.chat.id),
            sender: Sender::from_user(&query.from),
            data: query.data.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum InboundUpdate {
    Message(InboundMessage),
    Callback(InboundCallback),
    Unhandled,
}

impl InboundUpdate {
    pub fn from_update(update: &Update) -> Self {
        if let Some(message) = update.message.as_ref() {
            Self::Message(InboundMessage::from_message(message))
        } else if let Some(query) = update.callback_query.as_ref() {
            Self::Callback(InboundCallback::from_query(query))
        } else {
            Self::Unhandled
        }
    }

    /// Update type name as reported in operator alerts.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Callback(_) => "callback_query",
            Self::Unhandled => "unknown",
        }
    }

    /// Chat to reply in when something goes wrong.
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Self::Message(message) => Some(message.chat_id),
            Self::Callback(callback) => callback.chat_id,
            Self::Unhandled => None,
        }
    }

    pub fn sender_id(&self) -> Option<i64> {
        match self {
            Self::Message(message) => message.sender_id(),
            Self::Callback(callback) => Some(callback.sender.id),
            Self::Unhandled => None,
        }
    }
}
