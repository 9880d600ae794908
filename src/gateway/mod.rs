//! Gateway — the event loop connecting the channel, classifier, router,
//! record store, and provider.

mod devotional;
mod handlers;
mod pipeline;
mod router;

#[cfg(test)]
mod tests;

use devotional::DevotionalJob;
use shepherd_core::{
    config::{ConversationConfig, DevotionalConfig},
    message::{IncomingMessage, OutgoingMessage, ReplyKeyboard},
    traits::{Channel, Classifier, Provider},
};
use shepherd_store::RecordStore;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

/// The central gateway that routes messages between the channel and the
/// bot's handlers.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) classifier: Arc<dyn Classifier>,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) store: Arc<dyn RecordStore>,
    pub(super) devotional_config: DevotionalConfig,
    pub(super) conversation_config: ConversationConfig,
    /// Ephemeral per-user turn window — intentionally process-local,
    /// bounded, and lost on restart. Never written to the record store.
    pub(super) turn_window: Mutex<HashMap<String, VecDeque<String>>>,
    /// Queue feeding the deferred devotional worker.
    pub(super) devo_tx: mpsc::Sender<DevotionalJob>,
    devo_rx: Mutex<Option<mpsc::Receiver<DevotionalJob>>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        classifier: Arc<dyn Classifier>,
        channels: HashMap<String, Arc<dyn Channel>>,
        store: Arc<dyn RecordStore>,
        devotional_config: DevotionalConfig,
        conversation_config: ConversationConfig,
    ) -> Self {
        let (devo_tx, devo_rx) = mpsc::channel(32);
        Self {
            provider,
            classifier,
            channels,
            store,
            devotional_config,
            conversation_config,
            turn_window: Mutex::new(HashMap::new()),
            devo_tx,
            devo_rx: Mutex::new(Some(devo_rx)),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Shepherd gateway running | provider: {} | classifier: {} | channels: {}",
            self.provider.name(),
            self.classifier.name(),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Spawn the deferred devotional worker.
        if let Some(devo_rx) = self.devo_rx.lock().await.take() {
            let worker = self.clone();
            tokio::spawn(async move {
                worker.devotional_worker(devo_rx).await;
            });
        }

        // One message at a time: classifier → router → reply, to completion.
        while let Some(incoming) = rx.recv().await {
            self.handle_message(incoming).await;
        }

        info!("All channels closed, gateway shutting down");
        Ok(())
    }

    /// Send plain text back to the sender of `incoming`. Failures are logged
    /// and swallowed — the inbound webhook has already been acknowledged.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        self.send_reply(incoming, text, None).await;
    }

    pub(super) async fn send_reply(
        &self,
        incoming: &IncomingMessage,
        text: &str,
        keyboard: Option<ReplyKeyboard>,
    ) {
        let Some(channel) = self.channels.get(&incoming.channel) else {
            error!("no channel found for '{}'", incoming.channel);
            return;
        };
        let Some(ref target) = incoming.reply_target else {
            error!("no reply_target on message from {}", incoming.sender_id);
            return;
        };

        let mut msg = OutgoingMessage::text_to(target, text);
        msg.keyboard = keyboard;

        if let Err(e) = channel.send(msg).await {
            error!("failed to send reply via {}: {e}", incoming.channel);
        }
    }
}
