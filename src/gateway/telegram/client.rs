use super::types::*;
use crate::{Error, Result, config::TelegramConfig};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, time::Duration};
use tracing::debug;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Extra time granted on top of the long-poll timeout before reqwest gives up.
const POLL_GRACE_SECS: u64 = 10;

pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // base_url embeds the bot token
        f.debug_struct("TelegramClient")
            .field("base_url", &"[REDACTED]")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let token = config
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::config("Telegram gateway requires a bot token"))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + POLL_GRACE_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), token),
        })
    }

    async fn invoke<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::telegram(format!("{} request failed: {}", method, e.without_url())))?;

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            Error::telegram(format!("Failed to parse {} response: {}", method, e.without_url()))
        })?;

        if !envelope.ok {
            return Err(Error::telegram(format!(
                "{} rejected: {}",
                method,
                envelope.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        envelope
            .result
            .ok_or_else(|| Error::telegram(format!("{} response missing result field", method)))
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User> {
        self.invoke("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for new updates, waiting up to `timeout_secs` server-side.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };
        let updates: Vec<Update> = self.invoke("getUpdates", &request).await?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    /// Sends `text` to `chat_id`, split into several messages when it exceeds
    /// the Bot API length limit.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let request = SendMessageRequest {
                chat_id,
                text: chunk,
            };
            let _: serde_json::Value = self.invoke("sendMessage", &request).await?;
        }
        Ok(())
    }
}

/// Splits `text` into pieces of at most `max_chars` characters, preferring to
/// break after a newline.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let end = match rest[..hard_end].rfind('\n') {
            Some(idx) if idx > 0 => idx + 1,
            _ => hard_end,
        };
        chunks.push(&rest[..end]);
        rest = &rest[end..];
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}
