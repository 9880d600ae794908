//! SQLite-backed record store.

use crate::{Entry, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shepherd_core::config::{shellexpand, StoreConfig};
use shepherd_core::error::ShepherdError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr as _;
use tracing::info;

/// Durable record store backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, ShepherdError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ShepherdError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| ShepherdError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| ShepherdError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Record store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// In-memory SQLite database, used by tests.
    pub async fn in_memory() -> Result<Self, ShepherdError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| ShepherdError::Store(format!("failed to open in-memory db: {e}")))?;
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), ShepherdError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                list_key TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entries_list ON entries(list_key, id DESC);

            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS set_members (
                set_key TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (set_key, member)
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| ShepherdError::Store(format!("migration failed: {e}")))?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn append(&self, list_key: &str, body: &str) -> Result<(), ShepherdError> {
        sqlx::query("INSERT INTO entries (list_key, body, created_at) VALUES (?, ?, ?)")
            .bind(list_key)
            .bind(body)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| ShepherdError::Store(format!("append failed: {e}")))?;
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
        let limit = (end - start + 1) as i64;
        let offset = start as i64;

        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT body, created_at FROM entries
             WHERE list_key = ?
             ORDER BY id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(list_key)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShepherdError::Store(format!("peek_range failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(body, created_at)| Entry {
                body,
                created_at: parse_timestamp(&created_at),
            })
            .collect())
    }

    async fn pop_head(&self, list_key: &str) -> Result<Option<Entry>, ShepherdError> {
        let head: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT id, body, created_at FROM entries
             WHERE list_key = ?
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(list_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShepherdError::Store(format!("pop_head select failed: {e}")))?;

        let Some((id, body, created_at)) = head else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ShepherdError::Store(format!("pop_head delete failed: {e}")))?;

        Ok(Some(Entry {
            body,
            created_at: parse_timestamp(&created_at),
        }))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), ShepherdError> {
        sqlx::query(
            "INSERT INTO slots (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ShepherdError::Store(format!("set_value failed: {e}")))?;
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, ShepherdError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ShepherdError::Store(format!("get_value failed: {e}")))?;
        Ok(row.map(|(v,)| v))
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), ShepherdError> {
        sqlx::query("INSERT OR IGNORE INTO set_members (set_key, member) VALUES (?, ?)")
            .bind(set_key)
            .bind(member)
            .execute(&self.pool)
            .await
            .map_err(|e| ShepherdError::Store(format!("add_to_set failed: {e}")))?;
        Ok(())
    }

    async fn is_member(&self, set_key: &str, member: &str) -> Result<bool, ShepherdError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM set_members WHERE set_key = ? AND member = ?)",
        )
        .bind(set_key)
        .bind(member)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ShepherdError::Store(format!("is_member failed: {e}")))?;
        Ok(exists)
    }
}
