//! Outbound `sendMessage` calls.

use super::types::{ReplyKeyboardMarkup, SendMessageRequest, TgResponse};
use super::TelegramChannel;
use shepherd_core::{error::ShepherdError, message::ReplyKeyboard};
use tracing::debug;

impl TelegramChannel {
    /// Send plain text to a chat, with an optional reply keyboard.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&ReplyKeyboard>,
    ) -> Result<(), ShepherdError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            reply_markup: keyboard.map(ReplyKeyboardMarkup::from),
        };

        debug!("telegram: sendMessage to chat {chat_id} ({} chars)", text.len());

        let resp: TgResponse<serde_json::Value> = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShepherdError::Channel(format!("telegram sendMessage failed: {e}")))?
            .json()
            .await
            .map_err(|e| {
                ShepherdError::Channel(format!("telegram sendMessage parse failed: {e}"))
            })?;

        if !resp.ok {
            return Err(ShepherdError::Channel(format!(
                "telegram sendMessage rejected: {}",
                resp.description.unwrap_or_default()
            )));
        }

        Ok(())
    }
}
