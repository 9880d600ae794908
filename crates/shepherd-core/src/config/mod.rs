mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ShepherdError;
use defaults::*;

/// Top-level Shepherd configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub shepherd: ShepherdConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub devotional: DevotionalConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShepherdConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ShepherdConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config — webhook mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Address the webhook listener binds to.
    #[serde(default = "default_webhook_host")]
    pub webhook_host: String,
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            webhook_host: default_webhook_host(),
            webhook_port: default_webhook_port(),
        }
    }
}

/// Language-model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub default: String,
    pub openai: Option<OpenAiConfig>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default: default_provider(),
            openai: None,
        }
    }
}

/// OpenAI-compatible API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

/// Crisis classifier config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "moderation" (OpenAI moderation endpoint) or "keyword" (offline screen).
    #[serde(default = "default_classifier_backend")]
    pub backend: String,
    /// API key for the moderation backend. Empty = reuse the provider key.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_moderation_model")]
    pub model: String,
    /// Sent verbatim when a message is classified as a crisis.
    #[serde(default = "default_crisis_message")]
    pub crisis_message: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: default_classifier_backend(),
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_moderation_model(),
            crisis_message: default_crisis_message(),
        }
    }
}

/// Record store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" (durable, shared) or "memory" (volatile, for tests).
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            db_path: default_db_path(),
        }
    }
}

/// Devotional generation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevotionalConfig {
    /// When true, /devo replies with an acknowledgment and the devotional is
    /// generated by the background worker.
    #[serde(default)]
    pub deferred: bool,
    /// Generation attempts before giving up on a fresh scripture reference.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for DevotionalConfig {
    fn default() -> Self {
        Self {
            deferred: false,
            max_attempts: default_max_attempts(),
        }
    }
}

/// Open-conversation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// How many recent user messages are kept as ephemeral model context.
    #[serde(default = "default_turn_window")]
    pub turn_window: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            turn_window: default_turn_window(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, ShepherdError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ShepherdError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ShepherdError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
