//! Telegram Bot API client.
//!
//! Thin reqwest wrapper around the handful of methods this service uses.
//! The bot token is embedded in request URLs and must never be logged.

use crate::models::TelegramUpdate;
use serde::Deserialize;
use serde_json::{json, Value};

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org/bot";

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API returned status {0}")]
    Api(reqwest::StatusCode),
}

/// Response envelope of the getMe method.
#[derive(Debug, Deserialize)]
pub struct GetMeResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<BotProfile>,
}

#[derive(Debug, Deserialize)]
pub struct BotProfile {
    #[serde(default)]
    pub username: Option<String>,
}

/// Response envelope of the getUpdates method.
#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    #[serde(default)]
    result: Vec<TelegramUpdate>,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    use_test_api: bool,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, use_test_api: bool) -> Self {
        TelegramClient {
            http: reqwest::Client::new(),
            token: token.into(),
            use_test_api,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}{}/{}{}",
            TELEGRAM_API_BASE_URL,
            self.token,
            if self.use_test_api { "test/" } else { "" },
            method
        )
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, TelegramError> {
        let response = self
            .http
            .post(self.api_url(method))
            .json(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TelegramError::Api(response.status()));
        }

        Ok(response.json().await?)
    }

    /// getMe — used once at startup to resolve the bot username.
    pub async fn get_me(&self) -> Result<GetMeResponse, TelegramError> {
        let response = self.http.get(self.api_url("getMe")).send().await?;

        if !response.status().is_success() {
            return Err(TelegramError::Api(response.status()));
        }

        Ok(response.json().await?)
    }

    /// sendMessage with optional parse mode and reply threading.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_to_message_id: Option<i64>,
    ) -> Result<(), TelegramError> {
        let mut params = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            params["parse_mode"] = json!(mode);
        }
        if let Some(reply_to) = reply_to_message_id {
            params["reply_to_message_id"] = json!(reply_to);
        }

        self.call("sendMessage", params).await?;
        Ok(())
    }

    /// setWebhook — registers `url` for update delivery, guarded by the
    /// secret token echoed back in `X-Telegram-Bot-Api-Secret-Token`.
    pub async fn set_webhook(
        &self,
        external_url: &str,
        secret_token: &str,
    ) -> Result<Value, TelegramError> {
        self.call(
            "setWebhook",
            json!({
                "url": external_url,
                "secret_token": secret_token,
            }),
        )
        .await
    }

    /// getUpdates — polling fallback for local development.
    pub async fn get_updates(
        &self,
        last_update_id: Option<i64>,
    ) -> Result<Vec<TelegramUpdate>, TelegramError> {
        let params = match last_update_id {
            Some(id) => json!({ "offset": id + 1 }),
            None => json!({}),
        };

        let value = self.call("getUpdates", params).await?;
        let parsed: GetUpdatesResponse =
            serde_json::from_value(value).unwrap_or(GetUpdatesResponse { result: Vec::new() });
        Ok(parsed.result)
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[REDACTED]")
            .field("use_test_api", &self.use_test_api)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TelegramClient::new("123:abc", false);
        assert_eq!(
            client.api_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_api_url_test_mode() {
        let client = TelegramClient::new("123:abc", true);
        assert_eq!(
            client.api_url("getMe"),
            "https://api.telegram.org/bot123:abc/test/getMe"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = TelegramClient::new("123:secret-token", false);
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
