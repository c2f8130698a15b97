//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite` at the workspace root are
//! compiled into the binary and applied in filename order.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_local_storage.sql   local_storage(key, value, updated_at)
//! ```
//!
//! New schema goes in a new numbered file. An applied file must never be
//! edited: sqlx checksums it and refuses to start on a mismatch.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever has not run yet against `pool`.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let (total, before) = migration_status(pool).await?;
    debug!(total, applied = before, "Checking storage schema");

    MIGRATOR.run(pool).await?;

    if before < total {
        info!(applied = total - before, "Storage schema upgraded");
    }
    Ok(())
}

/// `(known, applied)` migration counts. A fresh database reports 0 applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let known = MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((known, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((known, applied.max(0) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_database_has_nothing_applied() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let (known, applied) = migration_status(db.pool()).await.unwrap();
        assert!(known >= 1);
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let (known, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(known, applied);
    }
}
