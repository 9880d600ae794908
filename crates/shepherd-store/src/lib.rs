//! # shepherd-store
//!
//! The Record Store: ordered per-user lists (journal, prayers), single-value
//! slots (latest devotional), and the year-scoped used-verse set.
//!
//! Two implementations behind one trait: [`SqliteStore`] (durable, shared)
//! and [`MemoryStore`] (volatile, for tests).

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shepherd_core::error::ShepherdError;

/// One stored list entry. Head of a list = most recently appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Key for a user's journal sequence.
pub fn journal_key(user_id: &str) -> String {
    format!("journal:{user_id}")
}

/// Key for a user's prayer sequence.
pub fn prayer_key(user_id: &str) -> String {
    format!("prayer:{user_id}")
}

/// Slot key for a user's latest devotional.
pub fn devotional_key(user_id: &str) -> String {
    format!("devotional:{user_id}")
}

/// Global used-verse set for one calendar year. The year in the key is what
/// resets the set — there is no explicit rollover.
pub fn verse_set_key(year: i32) -> String {
    format!("verses:{year}")
}

/// Narrow persistence contract for all of Shepherd's durable state.
///
/// Lists are ordered newest-first; `start`/`end` in [`peek_range`] are
/// inclusive and zero-indexed from the head. Display truncation (e.g.
/// "last 5") is a caller concern — the store never caps writes.
///
/// [`peek_range`]: RecordStore::peek_range
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Add `body` as the new head of the sequence `list_key`.
    async fn append(&self, list_key: &str, body: &str) -> Result<(), ShepherdError>;

    /// Entries between `start` and `end` inclusive, head first.
    async fn peek_range(
        &self,
        list_key: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<Entry>, ShepherdError>;

    /// Remove and return the head entry, or `None` if the sequence is empty.
    async fn pop_head(&self, list_key: &str) -> Result<Option<Entry>, ShepherdError>;

    /// Overwrite a single-value slot.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), ShepherdError>;

    /// Read a single-value slot. Absent is `None`, not an error.
    async fn get_value(&self, key: &str) -> Result<Option<String>, ShepherdError>;

    /// Add `member` to the set `set_key`. Adding an existing member is a no-op.
    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), ShepherdError>;

    /// Whether `member` is in the set `set_key`.
    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool, ShepherdError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_partition_by_user() {
        assert_eq!(journal_key("42"), "journal:42");
        assert_eq!(prayer_key("42"), "prayer:42");
        assert_ne!(journal_key("42"), journal_key("43"));
        assert_ne!(journal_key("42"), prayer_key("42"));
    }

    #[test]
    fn test_verse_set_key_scoped_by_year() {
        assert_eq!(verse_set_key(2026), "verses:2026");
        assert_ne!(verse_set_key(2026), verse_set_key(2027));
    }
}
