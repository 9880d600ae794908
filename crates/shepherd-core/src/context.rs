use serde::{Deserialize, Serialize};

/// A single entry in the short-term conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

/// Conversation context passed to the language-model provider.
///
/// The history is the ephemeral per-user turn window — never persisted,
/// bounded, lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// Recent user turns (oldest first).
    pub history: Vec<ContextEntry>,
    /// The current user message.
    pub current_message: String,
}

/// A structured message for API-based providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl Context {
    /// Create a context with just a current message and the given system prompt.
    pub fn new(system_prompt: &str, message: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            history: Vec::new(),
            current_message: message.to_string(),
        }
    }

    /// Convert context to structured API messages.
    ///
    /// Returns `(system_prompt, messages)` — the system prompt is separated
    /// because some APIs require it outside the messages array.
    pub fn to_api_messages(&self) -> (String, Vec<ApiMessage>) {
        let mut messages = Vec::with_capacity(self.history.len() + 1);

        for entry in &self.history {
            messages.push(ApiMessage {
                role: entry.role.clone(),
                content: entry.content.clone(),
            });
        }

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.current_message.clone(),
        });

        (self.system_prompt.clone(), messages)
    }
}
