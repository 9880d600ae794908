//! In-memory record store for tests and the `backend = "memory"` config.
//!
//! Same contract as the SQLite store, but volatile — everything is lost on
//! restart. Not suitable for multi-instance deployment.

use crate::{Entry, RecordStore};
use async_trait::async_trait;
use chrono::Utc;
use shepherd_core::error::ShepherdError;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    /// Head of each deque = most recently appended.
    lists: HashMap<String, VecDeque<Entry>>,
    slots: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
}

/// Volatile record store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, list_key: &str, body: &str) -> Result<(), ShepherdError> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(list_key.to_string())
            .or_default()
            .push_front(Entry {
                body: body.to_string(),
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn peek_range(
        &self,
        list_key: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<Entry>, ShepherdError> {
        if end < start {
            return Ok(Vec::new());
        }
        let inner = self.inner.lock().await;
        Ok(inner
            .lists
            .get(list_key)
            .map(|list| {
                list.iter()
                    .skip(start)
                    .take(end - start + 1)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn pop_head(&self, list_key: &str) -> Result<Option<Entry>, ShepherdError> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .lists
            .get_mut(list_key)
            .and_then(|list| list.pop_front()))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), ShepherdError> {
        let mut inner = self.inner.lock().await;
        inner.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, ShepherdError> {
        let inner = self.inner.lock().await;
        Ok(inner.slots.get(key).cloned())
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), ShepherdError> {
        let mut inner = self.inner.lock().await;
        inner
            .sets
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool, ShepherdError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sets
            .get(set_key)
            .is_some_and(|set| set.contains(member)))
    }
}
