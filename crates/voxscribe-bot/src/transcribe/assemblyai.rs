use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SpeechToText;

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";
const PROVIDER_NAME: &str = "AssemblyAI";

/// AssemblyAI REST client: upload, submit, then poll until the transcript settles.
pub struct AssemblyAiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    speech_model: String,
    poll_interval: Duration,
}

impl AssemblyAiProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<&str>,
        speech_model: &str,
        poll_interval: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            speech_model: speech_model.to_string(),
            poll_interval,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("{PROVIDER_NAME} API key not configured"))
    }

    async fn upload(&self, api_key: &str, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}/v2/upload", self.base_url);
        let response = self
            .http
            .post(url)
            .header("authorization", api_key)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|err| anyhow!("{PROVIDER_NAME} upload request failed: {err}"))?;
        let payload: UploadResponse = decode(response, "upload").await?;
        Ok(payload.upload_url)
    }

    async fn submit(&self, api_key: &str, audio_url: &str) -> Result<TranscriptResponse> {
        let url = format!("{}/v2/transcript", self.base_url);
        let request = TranscriptRequest {
            audio_url,
            speech_model: &self.speech_model,
        };
        let response = self
            .http
            .post(url)
            .header("authorization", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| anyhow!("{PROVIDER_NAME} transcript request failed: {err}"))?;
        decode(response, "transcript").await
    }

    async fn fetch(&self, api_key: &str, id: &str) -> Result<TranscriptResponse> {
        let url = format!("{}/v2/transcript/{id}", self.base_url);
        let response = self
            .http
            .get(url)
            .header("authorization", api_key)
            .send()
            .await
            .map_err(|err| anyhow!("{PROVIDER_NAME} status request failed: {err}"))?;
        decode(response, "status").await
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let api_key = self.api_key()?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read staged audio {}", path.display()))?;

        let upload_url = self.upload(api_key, bytes).await?;
        let mut transcript = self.submit(api_key, &upload_url).await?;
        tracing::debug!(id = %transcript.id, model = %self.speech_model, "Submitted transcript");

        loop {
            match transcript.status {
                TranscriptStatus::Completed => {
                    let text = transcript.text.unwrap_or_default();
                    tracing::info!(id = %transcript.id, chars = text.len(), "Transcript completed");
                    return Ok(text);
                }
                TranscriptStatus::Error => {
                    let detail = transcript
                        .error
                        .unwrap_or_else(|| "unknown error".to_string());
                    bail!("{PROVIDER_NAME} transcript {} failed: {detail}", transcript.id);
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    tokio::time::sleep(self.poll_interval).await;
                    transcript = self.fetch(api_key, &transcript.id).await?;
                }
            }
        }
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response, step: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|payload| payload.error)
            .unwrap_or(body);
        bail!("{PROVIDER_NAME} {step} failed: {status} {detail}");
    }
    response
        .json()
        .await
        .map_err(|err| anyhow!("Failed to decode {PROVIDER_NAME} {step} response: {err}"))
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    speech_model: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}
