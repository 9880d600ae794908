//! Command handlers and the conversational fallback.

use super::devotional::DevotionalJob;
use super::router::Command;
use super::Gateway;
use shepherd_core::{
    context::{Context, ContextEntry},
    message::{IncomingMessage, ReplyKeyboard},
    prompts,
};
use shepherd_store::{devotional_key, journal_key, prayer_key, Entry};
use std::collections::VecDeque;
use tracing::{error, warn};

impl Gateway {
    /// Execute a routed command. Returns the reply text and an optional
    /// keyboard (only /start and /help attach one).
    pub(super) async fn handle_command(
        &self,
        incoming: &IncomingMessage,
        command: Command,
    ) -> (String, Option<ReplyKeyboard>) {
        let user_id = incoming.sender_id.as_str();

        let reply = match command {
            Command::JournalWrite(body) => {
                self.record_write(
                    &journal_key(user_id),
                    &body,
                    prompts::JOURNAL_SAVED,
                    prompts::JOURNAL_USAGE,
                )
                .await
            }
            Command::JournalRead => {
                self.record_read(
                    &journal_key(user_id),
                    "Your recent journal entries",
                    prompts::JOURNAL_EMPTY,
                )
                .await
            }
            Command::JournalDeleteLatest => {
                self.record_delete(
                    &journal_key(user_id),
                    prompts::JOURNAL_DELETED,
                    prompts::JOURNAL_DELETE_EMPTY,
                )
                .await
            }
            Command::PrayerWrite(body) => {
                self.record_write(
                    &prayer_key(user_id),
                    &body,
                    prompts::PRAYER_SAVED,
                    prompts::PRAYER_USAGE,
                )
                .await
            }
            Command::PrayerRead => {
                self.record_read(
                    &prayer_key(user_id),
                    "Your recent prayers",
                    prompts::PRAYER_EMPTY,
                )
                .await
            }
            Command::PrayerDeleteLatest => {
                self.record_delete(
                    &prayer_key(user_id),
                    prompts::PRAYER_DELETED,
                    prompts::PRAYER_DELETE_EMPTY,
                )
                .await
            }
            Command::Devotional => self.handle_devotional(incoming).await,
            Command::AnotherVerse => {
                // Direct call, nothing persisted, no dedup against the
                // used-verse set.
                let context = Context::new(prompts::PERSONA, prompts::ANOTHER_VERSE);
                match self.provider.complete(&context).await {
                    Ok(resp) => resp.text,
                    Err(e) => {
                        error!("provider error on verse request: {e}");
                        prompts::CHAT_APOLOGY.to_string()
                    }
                }
            }
            Command::Meditate => self.handle_meditate(user_id).await,
            Command::Start => {
                return (prompts::WELCOME.to_string(), Some(ReplyKeyboard::commands()))
            }
            Command::Help => return (prompts::HELP.to_string(), Some(ReplyKeyboard::commands())),
        };

        (reply, None)
    }

    async fn record_write(
        &self,
        list_key: &str,
        body: &str,
        saved: &str,
        usage: &str,
    ) -> String {
        if body.is_empty() {
            return usage.to_string();
        }
        match self.store.append(list_key, body).await {
            Ok(()) => saved.to_string(),
            Err(e) => {
                error!("append to {list_key} failed: {e}");
                prompts::STORE_APOLOGY.to_string()
            }
        }
    }

    async fn record_read(&self, list_key: &str, heading: &str, empty: &str) -> String {
        // Last 5, newest first. Display cap only — the store keeps everything.
        match self.store.peek_range(list_key, 0, 4).await {
            Ok(entries) if entries.is_empty() => empty.to_string(),
            Ok(entries) => format_entries(heading, &entries),
            Err(e) => {
                error!("read of {list_key} failed: {e}");
                prompts::STORE_APOLOGY.to_string()
            }
        }
    }

    async fn record_delete(&self, list_key: &str, deleted: &str, empty: &str) -> String {
        match self.store.pop_head(list_key).await {
            Ok(Some(_)) => deleted.to_string(),
            Ok(None) => empty.to_string(),
            Err(e) => {
                error!("delete from {list_key} failed: {e}");
                prompts::STORE_APOLOGY.to_string()
            }
        }
    }

    async fn handle_devotional(&self, incoming: &IncomingMessage) -> String {
        if self.devotional_config.deferred {
            let job = DevotionalJob {
                user_id: incoming.sender_id.clone(),
                channel: incoming.channel.clone(),
                reply_target: incoming.reply_target.clone(),
            };
            match self.devo_tx.send(job).await {
                Ok(()) => return prompts::DEVOTIONAL_QUEUED.to_string(),
                Err(e) => {
                    warn!("devotional queue unavailable, generating inline: {e}");
                }
            }
        }
        self.generate_devotional(&incoming.sender_id).await
    }

    async fn handle_meditate(&self, user_id: &str) -> String {
        match self.store.get_value(&devotional_key(user_id)).await {
            Ok(None) => prompts::MEDITATE_NO_DEVOTIONAL.to_string(),
            Ok(Some(devo)) => {
                let context = Context::new(prompts::PERSONA, &prompts::meditation(&devo));
                match self.provider.complete(&context).await {
                    Ok(resp) => resp.text,
                    Err(e) => {
                        error!("provider error on meditation for {user_id}: {e}");
                        prompts::CHAT_APOLOGY.to_string()
                    }
                }
            }
            Err(e) => {
                error!("devotional slot read failed for {user_id}: {e}");
                prompts::STORE_APOLOGY.to_string()
            }
        }
    }

    /// Open conversation with the persona and the sender's recent turns.
    pub(super) async fn handle_fallback(&self, incoming: &IncomingMessage) -> String {
        let mut context = Context::new(prompts::PERSONA, &incoming.text);
        {
            let window = self.turn_window.lock().await;
            if let Some(turns) = window.get(&incoming.sender_id) {
                context.history = turns
                    .iter()
                    .map(|t| ContextEntry {
                        role: "user".to_string(),
                        content: t.clone(),
                    })
                    .collect();
            }
        }

        let reply = match self.provider.complete(&context).await {
            Ok(resp) => resp.text,
            Err(e) => {
                error!("provider error in conversation: {e}");
                prompts::CHAT_APOLOGY.to_string()
            }
        };

        // Record the turn afterwards so the current message appears once.
        let mut window = self.turn_window.lock().await;
        let turns = window
            .entry(incoming.sender_id.clone())
            .or_insert_with(VecDeque::new);
        turns.push_back(incoming.text.clone());
        while turns.len() > self.conversation_config.turn_window {
            turns.pop_front();
        }

        reply
    }
}

fn format_entries(heading: &str, entries: &[Entry]) -> String {
    let mut out = format!("{heading}:\n");
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. [{}] {}",
            i + 1,
            entry.created_at.format("%Y-%m-%d"),
            entry.body
        ));
    }
    out
}
