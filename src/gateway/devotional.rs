//! Devotional generation with year-scoped verse dedup, plus the deferred
//! delivery worker.

use super::Gateway;
use chrono::{Datelike, Utc};
use shepherd_core::{context::Context, message::OutgoingMessage, prompts, scripture};
use shepherd_store::{devotional_key, verse_set_key};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// A deferred devotional request, queued by /devo and drained by the worker.
pub(super) struct DevotionalJob {
    pub user_id: String,
    pub channel: String,
    pub reply_target: Option<String>,
}

impl Gateway {
    /// Generate a devotional whose scripture reference has not been used yet
    /// this calendar year. Retries generation up to `max_attempts` times; a
    /// duplicate or missing reference burns an attempt, it is not an error.
    pub(super) async fn generate_devotional(&self, user_id: &str) -> String {
        let set_key = verse_set_key(Utc::now().year());
        let max_attempts = self.devotional_config.max_attempts;

        for attempt in 1..=max_attempts {
            let context = Context::new(prompts::PERSONA, prompts::DEVOTIONAL);
            let devotional = match self.provider.complete(&context).await {
                Ok(resp) => resp.text,
                Err(e) => {
                    error!("devotional generation failed for {user_id}: {e}");
                    return prompts::DEVOTIONAL_APOLOGY.to_string();
                }
            };

            let Some(reference) = scripture::extract_reference(&devotional) else {
                debug!("devotional attempt {attempt}: no scripture reference, retrying");
                continue;
            };

            match self.store.is_member(&set_key, &reference).await {
                Ok(true) => {
                    debug!("devotional attempt {attempt}: {reference} already used this year");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!("verse set lookup failed for {user_id}: {e}");
                    return prompts::STORE_APOLOGY.to_string();
                }
            }

            if let Err(e) = self.store.add_to_set(&set_key, &reference).await {
                error!("verse set update failed for {user_id}: {e}");
                return prompts::STORE_APOLOGY.to_string();
            }
            if let Err(e) = self
                .store
                .set_value(&devotional_key(user_id), &devotional)
                .await
            {
                error!("devotional slot update failed for {user_id}: {e}");
                return prompts::STORE_APOLOGY.to_string();
            }

            info!("devotional for {user_id}: {reference} (attempt {attempt})");
            return devotional;
        }

        warn!("no fresh scripture reference after {max_attempts} attempts for {user_id}");
        prompts::DEVOTIONAL_APOLOGY.to_string()
    }

    /// Drain deferred devotional jobs and deliver the result directly through
    /// the originating channel.
    pub(super) async fn devotional_worker(&self, mut rx: mpsc::Receiver<DevotionalJob>) {
        info!("devotional worker started");

        while let Some(job) = rx.recv().await {
            let text = self.generate_devotional(&job.user_id).await;

            let Some(channel) = self.channels.get(&job.channel) else {
                error!("no channel '{}' for deferred devotional", job.channel);
                continue;
            };
            let Some(ref target) = job.reply_target else {
                error!("no reply target for deferred devotional to {}", job.user_id);
                continue;
            };

            if let Err(e) = channel.send(OutgoingMessage::text_to(target, text)).await {
                error!("failed to deliver deferred devotional via {}: {e}", job.channel);
            }
        }

        info!("devotional worker stopped");
    }
}
