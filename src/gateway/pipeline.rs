//! Per-message processing: crisis gate, then router, then reply.

use super::{router, Gateway};
use shepherd_core::message::IncomingMessage;
use shepherd_core::traits::Verdict;
use tracing::{info, warn};

impl Gateway {
    /// Process one incoming message to completion.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let preview: String = incoming.text.chars().take(50).collect();
        info!(
            "[{}] message from {}: {preview}",
            incoming.channel, incoming.sender_id
        );

        // The crisis check runs before any routing, commands included.
        match self.classifier.classify(&incoming.text).await {
            Ok(Verdict::Crisis(reply)) => {
                warn!(
                    "crisis verdict for {}, sending support message",
                    incoming.sender_id
                );
                self.send_text(&incoming, &reply).await;
                return;
            }
            Ok(Verdict::Safe) => {}
            Err(e) => {
                // Fail open: a classifier outage must not silence the bot.
                warn!("classifier error, continuing unscreened: {e}");
            }
        }

        match router::parse(&incoming.text) {
            Some(command) => {
                let (reply, keyboard) = self.handle_command(&incoming, command).await;
                self.send_reply(&incoming, &reply, keyboard).await;
            }
            None => {
                let reply = self.handle_fallback(&incoming).await;
                self.send_text(&incoming, &reply).await;
            }
        }
    }
}
