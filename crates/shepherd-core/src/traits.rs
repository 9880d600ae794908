use crate::{
    context::Context,
    error::ShepherdError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Language-model provider trait.
///
/// Every chat backend (OpenAI-compatible API, local model, mocks in tests)
/// implements this trait to provide a uniform interface.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a conversation context to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, ShepherdError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Safety verdict for an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    /// The message to send verbatim instead of routing further.
    Crisis(String),
}

/// Crisis classifier trait.
///
/// Runs before the command router on every message. Callers fail open on
/// `Err` — a classifier outage must not block a pastoral response.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Human-readable classifier name.
    fn name(&self) -> &str;

    /// Classify raw message text.
    async fn classify(&self, text: &str) -> Result<Verdict, ShepherdError>;
}

/// Messaging channel trait.
///
/// Every messaging platform implements this trait to receive and send
/// messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, ShepherdError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), ShepherdError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ShepherdError> {
        Ok(())
    }
}
