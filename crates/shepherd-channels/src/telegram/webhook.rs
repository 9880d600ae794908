//! Inbound webhook listener.
//!
//! Telegram re-delivers updates on non-2xx responses, so every envelope is
//! acknowledged with 200 — an unrecognizable body is a logged no-op, never
//! an error back to Telegram.

use super::types::TgUpdate;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use shepherd_core::message::IncomingMessage;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Shared state for webhook handlers.
#[derive(Clone)]
pub(crate) struct WebhookState {
    pub tx: mpsc::Sender<IncomingMessage>,
}

/// Build the webhook router.
pub(crate) fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/webhook", post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// `GET /` — liveness probe.
async fn home() -> &'static str {
    "Shepherd is online and ready."
}

/// `POST /webhook` — Telegram update delivery.
async fn webhook(
    State(state): State<WebhookState>,
    body: Result<Json<TgUpdate>, JsonRejection>,
) -> StatusCode {
    let update = match body {
        Ok(Json(update)) => update,
        Err(e) => {
            debug!("ignoring unrecognizable webhook body: {e}");
            return StatusCode::OK;
        }
    };

    let Some(msg) = update.message else {
        debug!("ignoring update without message");
        return StatusCode::OK;
    };

    let Some(text) = msg.text else {
        debug!("ignoring message without text from chat {}", msg.chat.id);
        return StatusCode::OK;
    };

    let sender_name = msg.from.as_ref().map(|u| {
        if let Some(ref un) = u.username {
            format!("@{un}")
        } else if let Some(ref ln) = u.last_name {
            format!("{} {ln}", u.first_name)
        } else {
            u.first_name.clone()
        }
    });

    let incoming = IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender_id: msg.chat.id.to_string(),
        sender_name,
        text,
        timestamp: Utc::now(),
        reply_target: Some(msg.chat.id.to_string()),
    };

    if state.tx.send(incoming).await.is_err() {
        // Receiver gone during shutdown; ack anyway so Telegram doesn't retry.
        info!("webhook receiver dropped, discarding update");
    }

    StatusCode::OK
}
