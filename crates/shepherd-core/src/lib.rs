//! # shepherd-core
//!
//! Core types, traits, configuration, and error handling for the Shepherd bot.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod prompts;
pub mod scripture;
pub mod traits;
