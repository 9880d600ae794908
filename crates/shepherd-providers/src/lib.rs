//! # shepherd-providers
//!
//! External collaborators: the OpenAI-compatible chat provider and the
//! crisis classifier. Both are stateless pass-throughs — they own no data.

pub mod moderation;
pub mod openai;

pub use moderation::{KeywordClassifier, ModerationClassifier};
pub use openai::OpenAiProvider;
