//! Telegram Bot API wire types.

use serde::{Deserialize, Serialize};
use shepherd_core::message::ReplyKeyboard;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    #[allow(dead_code)]
    pub result: Option<T>,
    pub description: Option<String>,
}

/// Webhook update envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    #[allow(dead_code)]
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    #[allow(dead_code)]
    pub chat_type: String,
}

// --- Outbound ---

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyboardButton {
    pub text: String,
}

impl From<&ReplyKeyboard> for ReplyKeyboardMarkup {
    fn from(kb: &ReplyKeyboard) -> Self {
        Self {
            keyboard: kb
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.clone(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_deserializes() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "first_name": "Joe", "username": "joe"},
                "chat": {"id": 42, "type": "private"},
                "text": "/journal Today I felt grateful"
            }
        }"#;
        let update: TgUpdate = serde_json::from_str(json).unwrap();
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, 42);
        assert_eq!(msg.text.as_deref(), Some("/journal Today I felt grateful"));
    }

    #[test]
    fn test_update_without_message() {
        // Edited messages, channel posts etc. arrive without a `message` field.
        let json = r#"{"update_id": 11, "edited_message": {"message_id": 2}}"#;
        let update: TgUpdate = serde_json::from_str(json).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_reply_markup_serializes_keyboard() {
        let kb = ReplyKeyboard {
            rows: vec![vec!["/devo".into()], vec!["/help".into()]],
        };
        let markup = ReplyKeyboardMarkup::from(&kb);
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["keyboard"][0][0]["text"], "/devo");
        assert_eq!(json["resize_keyboard"], true);
    }

    #[test]
    fn test_send_request_omits_empty_markup() {
        let req = SendMessageRequest {
            chat_id: 42,
            text: "hello".into(),
            reply_markup: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("reply_markup"));
    }
}
