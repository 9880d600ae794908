//! # shepherd-channels
//!
//! Messaging platform integrations for Shepherd.

pub mod telegram;
