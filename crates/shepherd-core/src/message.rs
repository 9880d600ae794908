use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID — the partition key for all stored records.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
    /// Platform-specific target for routing (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Optional fixed on-screen keyboard (rows of button labels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<ReplyKeyboard>,
}

/// Metadata about how a reply was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

/// A platform-agnostic reply keyboard: rows of button labels.
///
/// Channels map this onto their native reply-markup structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    /// The fixed command keyboard shown on /start and /help.
    pub fn commands() -> Self {
        Self {
            rows: vec![
                vec!["/journal".into(), "/myjournal".into()],
                vec!["/pray".into(), "/myprayers".into()],
                vec!["/devo".into(), "/meditate".into()],
                vec!["/help".into()],
            ],
        }
    }
}

impl OutgoingMessage {
    /// A plain text reply to the given target.
    pub fn text_to(target: &str, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: MessageMetadata::default(),
            reply_target: Some(target.to_string()),
            keyboard: None,
        }
    }
}
