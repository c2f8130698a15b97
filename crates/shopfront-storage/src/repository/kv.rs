//! # Key-Value Repository
//!
//! String values addressed by key. Every write replaces the whole value,
//! matching local-storage semantics.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository over the `local_storage` table.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        debug!(key = %key, bytes = value.len(), "Writing storage key");

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes `key`. Returns whether a value was present.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists stored keys in ascending order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Deletes every key.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_then_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        assert_eq!(kv.get("missing").await.unwrap(), None);

        kv.set("a", "1").await.unwrap();
        kv.set("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        kv.set("b", "x").await.unwrap();
        kv.set("a", "y").await.unwrap();
        assert_eq!(kv.keys().await.unwrap(), vec!["a", "b"]);

        assert!(kv.remove("a").await.unwrap());
        assert!(!kv.remove("a").await.unwrap());

        kv.clear().await.unwrap();
        assert!(kv.keys().await.unwrap().is_empty());
    }
}
