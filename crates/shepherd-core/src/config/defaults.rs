//! Default value functions used by serde for config deserialization.

use crate::prompts;

pub fn default_name() -> String {
    "Shepherd".to_string()
}

pub fn default_data_dir() -> String {
    "~/.shepherd".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_provider() -> String {
    "openai".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_classifier_backend() -> String {
    "moderation".to_string()
}

pub fn default_moderation_model() -> String {
    "omni-moderation-latest".to_string()
}

pub fn default_crisis_message() -> String {
    prompts::CRISIS_DEFAULT.to_string()
}

pub fn default_store_backend() -> String {
    "sqlite".to_string()
}

pub fn default_db_path() -> String {
    "~/.shepherd/data/records.db".to_string()
}

pub fn default_webhook_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_webhook_port() -> u16 {
    8080
}

pub fn default_max_attempts() -> u32 {
    5
}

pub fn default_turn_window() -> usize {
    5
}
