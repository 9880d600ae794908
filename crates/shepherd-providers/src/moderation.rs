//! Crisis classifiers.
//!
//! The gate itself (run order, fail-open policy) lives in the gateway; these
//! are only the verdict sources. `ModerationClassifier` calls the OpenAI
//! moderation endpoint; `KeywordClassifier` is an offline screen for the
//! `backend = "keyword"` config and for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shepherd_core::{
    config::ClassifierConfig,
    error::ShepherdError,
    traits::{Classifier, Verdict},
};
use std::collections::HashMap;
use tracing::debug;

/// Crisis classifier backed by the OpenAI moderation endpoint.
pub struct ModerationClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    crisis_message: String,
}

impl ModerationClassifier {
    /// Create from config. `fallback_api_key` is the provider key, used when
    /// the classifier section has none of its own.
    pub fn from_config(config: &ClassifierConfig, fallback_api_key: &str) -> Self {
        let api_key = if config.api_key.is_empty() {
            fallback_api_key.to_string()
        } else {
            config.api_key.clone()
        };
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            crisis_message: config.crisis_message.clone(),
        }
    }
}

#[derive(Serialize)]
struct ModerationRequest {
    model: String,
    input: String,
}

#[derive(Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, bool>,
}

/// Category names that signal a personal crisis rather than generic policy
/// violations. Only these trigger the crisis reply.
fn is_crisis_category(name: &str) -> bool {
    name.starts_with("self-harm") || name == "self_harm"
}

fn crisis_flagged(result: &ModerationResult) -> bool {
    result.flagged
        && result
            .categories
            .iter()
            .any(|(name, &hit)| hit && is_crisis_category(name))
}

#[async_trait]
impl Classifier for ModerationClassifier {
    fn name(&self) -> &str {
        "moderation"
    }

    async fn classify(&self, text: &str) -> Result<Verdict, ShepherdError> {
        let url = format!("{}/moderations", self.base_url.trim_end_matches('/'));
        let body = ModerationRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ShepherdError::Classifier(format!("moderation request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(ShepherdError::Classifier(format!(
                "moderation returned {status}"
            )));
        }

        let parsed: ModerationResponse = resp.json().await.map_err(|e| {
            ShepherdError::Classifier(format!("moderation: failed to parse response: {e}"))
        })?;

        let crisis = parsed.results.iter().any(crisis_flagged);
        debug!("moderation verdict: crisis={crisis}");

        if crisis {
            Ok(Verdict::Crisis(self.crisis_message.clone()))
        } else {
            Ok(Verdict::Safe)
        }
    }
}

/// Substring phrases that mark a message as a crisis for the offline screen.
const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "end my life",
    "suicide",
    "suicidal",
    "want to die",
    "hurt myself",
    "self harm",
    "self-harm",
];

/// Offline keyword screen. Never fails.
pub struct KeywordClassifier {
    crisis_message: String,
}

impl KeywordClassifier {
    pub fn new(crisis_message: &str) -> Self {
        Self {
            crisis_message: crisis_message.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, text: &str) -> Result<Verdict, ShepherdError> {
        let lowered = text.to_lowercase();
        if CRISIS_PHRASES.iter().any(|p| lowered.contains(p)) {
            Ok(Verdict::Crisis(self.crisis_message.clone()))
        } else {
            Ok(Verdict::Safe)
        }
    }
}
