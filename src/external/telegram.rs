use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use reqwest::multipart;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Button press on an inline keyboard; `data` carries the opaque payload the
/// button was created with.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardMarkup {
    /// One-row keyboard with a single callback button.
    pub fn single_button(text: &str, callback_data: &str) -> Self {
        InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                callback_data: Some(callback_data.to_string()),
            }]],
        }
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Long-poll for incoming updates. Blocks server-side for up to the
    /// configured poll timeout when there is nothing to deliver.
    pub async fn get_updates(&self, offset: i64) -> AppResult<Vec<Update>> {
        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(self.config.poll_timeout_secs + 10))
            .json(&json!({
                "offset": offset,
                "timeout": self.config.poll_timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<Message> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Upload a photo from the local filesystem.
    pub async fn send_photo_file(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> AppResult<Message> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        self.send_photo_bytes(chat_id, bytes, &file_name, caption, reply_markup)
            .await
    }

    /// Upload a photo held in memory.
    pub async fn send_photo_bytes(
        &self,
        chat_id: i64,
        bytes: Vec<u8>,
        file_name: &str,
        caption: Option<&str>,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> AppResult<Message> {
        let mut form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part(
                "photo",
                multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            );
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }
        if let Some(markup) = reply_markup {
            form = form.text("reply_markup", serde_json::to_string(markup)?);
        }

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Acknowledge a callback query so the client stops showing a spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> AppResult<bool> {
        let response = self
            .client
            .post(self.method_url("answerCallbackQuery"))
            .json(&json!({
                "callback_query_id": callback_query_id,
            }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        let body: ApiResponse<T> = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                return Err(AppError::TelegramApiError(format!(
                    "HTTP {status}: {err}"
                )));
            }
        };
        if !body.ok {
            return Err(AppError::TelegramApiError(
                body.description
                    .unwrap_or_else(|| format!("request rejected with HTTP {status}")),
            ));
        }
        body.result
            .ok_or_else(|| AppError::TelegramApiError("response missing result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> TelegramClient {
        TelegramClient::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            api_url: "https://api.telegram.org/".to_string(),
            poll_timeout_secs: 25,
        })
    }

    #[test]
    fn test_method_url() {
        let client = test_client();
        assert_eq!(
            client.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_single_button_markup_shape() {
        let markup = InlineKeyboardMarkup::single_button("Получить!", "7");
        let value = serde_json::to_value(&markup).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "inline_keyboard": [[{"text": "Получить!", "callback_data": "7"}]]
            })
        );
    }

    #[test]
    fn test_update_deserializes_with_unknown_fields() {
        let raw = serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "date": 1_700_000_000,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "username": "alice"},
                "text": "/start"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(update.callback_query.is_none());
    }
}
