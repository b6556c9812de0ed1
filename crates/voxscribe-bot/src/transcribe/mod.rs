//! Speech-to-text client: stages audio bytes on disk and hands the path to a provider.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tempfile::NamedTempFile;

mod assemblyai;

pub use assemblyai::AssemblyAiProvider;

const STAGING_PREFIX: &str = "voxscribe_audio_";
const STAGING_SUFFIX: &str = ".ogg";

/// An external speech-to-text service that transcribes a local audio file.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Provider name as it appears in its error messages.
    fn name(&self) -> &'static str;

    /// Returns the recognised text, possibly empty when no speech was detected.
    async fn transcribe_file(&self, path: &Path) -> anyhow::Result<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Failed to transcribe audio")]
    TranscriptionFailed {
        provider: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Clone)]
pub struct Transcriber {
    provider: Arc<dyn SpeechToText>,
    staging_dir: PathBuf,
}

impl Transcriber {
    pub fn new(provider: Arc<dyn SpeechToText>) -> Self {
        Self::with_staging_dir(provider, std::env::temp_dir())
    }

    pub fn with_staging_dir(provider: Arc<dyn SpeechToText>, staging_dir: PathBuf) -> Self {
        Self {
            provider,
            staging_dir,
        }
    }

    /// Transcribes one in-memory audio buffer.
    ///
    /// The bytes live in a randomly named staging file for the duration of the
    /// provider call; the file is removed on every exit path.
    ///
    /// # Errors
    /// Returns `TranscriptionFailed` on empty input, staging I/O errors, or provider errors.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let provider = self.provider.name();
        let result = self.stage_and_transcribe(audio).await;
        result.map_err(|source| {
            tracing::error!(provider, error = %format!("{source:#}"), "Transcription error");
            TranscriptionError::TranscriptionFailed { provider, source }
        })
    }

    async fn stage_and_transcribe(&self, audio: &[u8]) -> anyhow::Result<String> {
        if audio.is_empty() {
            anyhow::bail!("{} received an empty audio buffer", self.provider.name());
        }

        let staged = self.stage(audio).await?;
        tracing::debug!(path = %staged.path().display(), bytes = audio.len(), "Staged audio");

        let transcript = self.provider.transcribe_file(staged.path()).await;

        if let Err(err) = staged.close() {
            tracing::warn!("Failed to remove staged audio: {err}");
        }
        transcript
    }

    async fn stage(&self, audio: &[u8]) -> anyhow::Result<NamedTempFile> {
        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.staging_dir)
            .with_context(|| format!("create staging file in {}", self.staging_dir.display()))?;
        tokio::fs::write(staged.path(), audio)
            .await
            .context("write staging file")?;
        Ok(staged)
    }
}
