use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod types;

pub use types::{
    BotCommandSpec, CallbackQuery, InlineKeyboardMarkup, Message, TelegramFile, Update, User,
};

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";
const TELEGRAM_PARSE_MODE: &str = "Markdown";

/// Thin client over the Telegram Bot API methods the bot needs.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE_URL)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            limit: None,
            timeout: timeout.as_secs(),
            allowed_updates: Some(vec!["message", "callback_query"]),
        };
        self.post("getUpdates", &request).await
    }

    /// Acknowledges every update below `offset` without waiting for new ones.
    pub async fn confirm_updates(&self, offset: i64) -> Result<()> {
        let request = GetUpdatesRequest {
            offset: Some(offset),
            limit: Some(1),
            timeout: 0,
            allowed_updates: None,
        };
        let _: Vec<Update> = self.post("getUpdates", &request).await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile> {
        let request = GetFileRequest { file_id };
        self.post("getFile", &request).await
    }

    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/file/bot{}/{}", self.base_url, self.token, file_path);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| anyhow!("Telegram file download failed: {}", err.without_url()))?;

        if !response.status().is_success() {
            bail!(
                "Telegram file download failed with status {}",
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| anyhow!("Failed to read Telegram file bytes: {}", err.without_url()))?;
        Ok(bytes.to_vec())
    }

    /// Sends a Markdown message and returns the created message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: Some(TELEGRAM_PARSE_MODE),
            reply_markup,
        };
        self.post("sendMessage", &request).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let request = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
            parse_mode: Some(TELEGRAM_PARSE_MODE),
            reply_markup,
        };
        // Result is the edited Message, or `true` for inline messages.
        let _: serde_json::Value = self.post("editMessageText", &request).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let request = AnswerCallbackQueryRequest { callback_query_id };
        let _: bool = self.post("answerCallbackQuery", &request).await?;
        Ok(())
    }

    pub async fn set_my_commands(&self, commands: &[BotCommandSpec]) -> Result<()> {
        let request = SetMyCommandsRequest { commands };
        let _: bool = self.post("setMyCommands", &request).await?;
        Ok(())
    }

    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        let request = SetWebhookRequest { url };
        let _: bool = self.post("setWebhook", &request).await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        let _: bool = self.post("deleteWebhook", &serde_json::json!({})).await?;
        Ok(())
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, method: &str, body: &B) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| anyhow!("Telegram {method} request failed: {}", err.without_url()))?;

        let payload: TelegramResponse<T> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to decode Telegram {method} response: {err}"))?;

        if !payload.ok {
            let description = payload
                .description
                .unwrap_or_else(|| "Telegram API error".to_string());
            bail!("{}", description);
        }

        payload
            .result
            .ok_or_else(|| anyhow!("Telegram {method} response missing result"))
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_updates: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: &'a [BotCommandSpec],
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
}
