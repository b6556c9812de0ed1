//! Failure taxonomy for audio handling: operator subject, user-facing text.

use std::fmt;

use crate::texts;
use crate::transcribe::TranscriptionError;

/// `sendMessage` and `editMessageText` word this error differently.
const MESSAGE_TOO_LONG_MARKERS: [&str; 2] = ["message is too long", "message_too_long"];

/// Context marker attached to errors raised while fetching an attachment.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("Telegram file download failed")]
pub(crate) struct DownloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    UnsupportedAttachment,
    DownloadFailure,
    TranscriptionServiceFailure,
    EmptyTranscript,
    MessageTooLong,
    UnknownFailure,
}

impl FailureKind {
    /// Classifies an error raised by the audio pipeline.
    ///
    /// Service failures are recognised by the provider name appearing anywhere
    /// in the error chain, so a provider must name itself in its errors.
    pub fn classify(err: &anyhow::Error) -> Self {
        let chain_mentions =
            |needle: &str| err.chain().any(|cause| cause.to_string().contains(needle));
        let provider = err.chain().find_map(|cause| {
            cause
                .downcast_ref::<TranscriptionError>()
                .map(|TranscriptionError::TranscriptionFailed { provider, .. }| *provider)
        });

        if err.chain().any(|cause| is_message_too_long(&cause.to_string())) {
            Self::MessageTooLong
        } else if err.downcast_ref::<DownloadError>().is_some() {
            Self::DownloadFailure
        } else if provider.is_some_and(chain_mentions) {
            Self::TranscriptionServiceFailure
        } else {
            Self::UnknownFailure
        }
    }

    pub fn subject(self, sender_name: &str) -> String {
        match self {
            Self::UnsupportedAttachment => "Unsupported File Type Received".to_string(),
            Self::DownloadFailure => format!("{sender_name} Telegram File Download Failure"),
            Self::TranscriptionServiceFailure => "Transcription Service Failure".to_string(),
            Self::EmptyTranscript => "Transcription Failed - No Speech Detected".to_string(),
            Self::MessageTooLong => "Critical Bot Error".to_string(),
            Self::UnknownFailure => "Unknown Error in Audio Handler".to_string(),
        }
    }

    pub fn user_text(self) -> &'static str {
        match self {
            Self::UnsupportedAttachment => texts::UNSUPPORTED,
            Self::DownloadFailure => texts::DOWNLOAD_ERROR,
            Self::TranscriptionServiceFailure => texts::SERVICE_ERROR,
            Self::EmptyTranscript => texts::NO_SPEECH,
            Self::MessageTooLong => texts::MESSAGE_TOO_LONG,
            Self::UnknownFailure => texts::UNKNOWN_ERROR,
        }
    }

    /// Whether the reply goes out as a fresh message instead of editing the acknowledgment.
    pub fn replies_fresh(self) -> bool {
        matches!(self, Self::MessageTooLong)
    }
}

fn is_message_too_long(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    MESSAGE_TOO_LONG_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedAttachment => "unsupported_attachment",
            Self::DownloadFailure => "download_failure",
            Self::TranscriptionServiceFailure => "transcription_service_failure",
            Self::EmptyTranscript => "empty_transcript",
            Self::MessageTooLong => "message_too_long",
            Self::UnknownFailure => "unknown_failure",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, anyhow};

    use super::*;

    fn download_failure() -> anyhow::Error {
        Err::<(), _>(anyhow!("Telegram file download failed with status 404 Not Found"))
            .context(DownloadError)
            .unwrap_err()
    }

    fn transcription_failure(detail: &str) -> anyhow::Error {
        TranscriptionError::TranscriptionFailed {
            provider: "AssemblyAI",
            source: anyhow!("{detail}"),
        }
        .into()
    }

    #[test]
    fn download_marker_is_a_download_failure() {
        assert_eq!(
            FailureKind::classify(&download_failure()),
            FailureKind::DownloadFailure
        );
    }

    #[test]
    fn provider_name_in_chain_is_a_service_failure() {
        let err = transcription_failure("AssemblyAI upload failed: 401 Invalid API key");
        assert_eq!(
            FailureKind::classify(&err),
            FailureKind::TranscriptionServiceFailure
        );
    }

    #[test]
    fn transcription_error_without_provider_name_is_unknown() {
        let err = transcription_failure("create staging file in /tmp: permission denied");
        assert_eq!(FailureKind::classify(&err), FailureKind::UnknownFailure);
    }

    #[test]
    fn message_too_long_is_detected_through_context() {
        let err = anyhow!("Bad Request: message is too long").context("edit transcript reply");
        assert_eq!(FailureKind::classify(&err), FailureKind::MessageTooLong);
        assert!(FailureKind::MessageTooLong.replies_fresh());
    }

    #[test]
    fn edit_wording_of_message_too_long_is_detected() {
        let err = anyhow!("Bad Request: MESSAGE_TOO_LONG")
            .context("edit acknowledgment with transcript");
        assert_eq!(FailureKind::classify(&err), FailureKind::MessageTooLong);
    }

    #[test]
    fn anything_else_is_unknown() {
        let err = anyhow!("Bad Request: chat not found");
        assert_eq!(FailureKind::classify(&err), FailureKind::UnknownFailure);
        assert!(!FailureKind::UnknownFailure.replies_fresh());
    }

    #[test]
    fn subjects_match_operator_alerts() {
        assert_eq!(
            FailureKind::DownloadFailure.subject("Ada"),
            "Ada Telegram File Download Failure"
        );
        assert_eq!(
            FailureKind::MessageTooLong.subject("Ada"),
            "Critical Bot Error"
        );
        assert_eq!(
            FailureKind::EmptyTranscript.subject("Ada"),
            "Transcription Failed - No Speech Detected"
        );
    }
}
