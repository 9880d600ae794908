//! Telegram Bot API channel.
//!
//! Inbound messages arrive on an axum webhook endpoint; responses go out
//! through `sendMessage`. Docs: <https://core.telegram.org/bots/api>

mod send;
mod webhook;

pub(crate) mod types;

use async_trait::async_trait;
use shepherd_core::{
    config::TelegramConfig,
    error::ShepherdError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Telegram channel using the Bot API in webhook mode.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ShepherdError> {
        let (tx, rx) = mpsc::channel(64);

        let app = webhook::router(webhook::WebhookState { tx });
        let addr = format!("{}:{}", self.config.webhook_host, self.config.webhook_port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ShepherdError::Channel(format!("webhook bind to {addr} failed: {e}")))?;

        info!("Telegram webhook listening on {addr}");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("telegram webhook server error: {e}");
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ShepherdError> {
        let chat_id_str = message
            .reply_target
            .as_deref()
            .ok_or_else(|| ShepherdError::Channel("no reply_target on outgoing message".into()))?;

        let chat_id: i64 = chat_id_str.parse().map_err(|e| {
            ShepherdError::Channel(format!("invalid telegram chat_id '{chat_id_str}': {e}"))
        })?;

        self.send_text(chat_id, &message.text, message.keyboard.as_ref())
            .await
    }

    async fn stop(&self) -> Result<(), ShepherdError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
