//! Database schema migrations
//!
//! Versioned schema migrations tracked in the `schema_version` table.
//! Every migration is idempotent: safe to run against a database that
//! already has the change.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - They must remain stable for databases upgrading from older versions
//! 2. **Always add new migrations** - Create a new migration function for each schema change
//! 3. **Test migrations** - Verify they work on databases with old schema

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::Result;

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: enforce one score per test link and one answer per question
///
/// Databases written by the earlier layout stored scores through a
/// read-then-write "save or update" and could hold duplicate rows. Keep the
/// newest score per link and the newest answer per (link, question), then
/// add unique indexes so score writes can be single-statement upserts.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let scores_removed = sqlx::query(
        r#"
        DELETE FROM scores
        WHERE rowid NOT IN (
            SELECT MAX(rowid) FROM scores GROUP BY test_link_id
        )
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let answers_removed = sqlx::query(
        r#"
        DELETE FROM answers
        WHERE rowid NOT IN (
            SELECT MAX(rowid) FROM answers GROUP BY test_link_id, question_number
        )
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS uq_scores_test_link ON scores(test_link_id)")
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_answers_link_question ON answers(test_link_id, question_number)",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    if scores_removed > 0 || answers_removed > 0 {
        warn!(
            scores_removed,
            answers_removed, "Migration v1: removed duplicate rows"
        );
    }

    Ok(())
}
