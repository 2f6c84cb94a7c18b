//! Database initialization
//!
//! Opens (creating if needed) the SQLite database, then runs the three
//! startup phases:
//! 1. `CREATE TABLE IF NOT EXISTS` for every table
//! 2. Versioned migrations for databases created by older layouts
//! 3. Index creation

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::{Error, Result};

/// Initialize database connection and create tables if needed
pub async fn init_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let newly_created = !config.path.exists();

    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let path = config
        .path
        .to_str()
        .ok_or_else(|| Error::Config(format!("Database path is not UTF-8: {:?}", config.path)))?;

    // Per-connection settings: every pooled connection enforces foreign keys
    // and waits on a locked database instead of failing at once.
    let options = SqliteConnectOptions::from_str(path)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", config.path.display());
    } else {
        info!("Opened existing database: {}", config.path.display());
    }

    create_schema(&pool).await?;

    info!(
        "Database ready: {} connections, busy_timeout={}ms",
        config.max_connections, config.busy_timeout_ms
    );

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// An in-memory SQLite database lives and dies with its connection, so the
/// pool is capped at one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables, run migrations, create indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_respondents_table(pool).await?;
    create_test_links_table(pool).await?;
    create_answers_table(pool).await?;
    create_scores_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    create_indexes(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the respondents table
///
/// One row per distinct normalized name (see `fingerprint::name_fingerprint`).
pub async fn create_respondents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS respondents (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_fingerprint TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the test_links table
///
/// One administration of the questionnaire, reachable only through `token`.
pub async fn create_test_links_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS test_links (
            guid TEXT PRIMARY KEY,
            respondent_id TEXT NOT NULL REFERENCES respondents(guid) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            state TEXT NOT NULL DEFAULT 'NOT_STARTED'
                CHECK (state IN ('NOT_STARTED', 'IN_PROGRESS', 'COMPLETE')),
            started_at TIMESTAMP,
            completed_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL,
            CHECK (state = 'NOT_STARTED' OR started_at IS NOT NULL),
            CHECK (completed_at IS NULL OR (started_at IS NOT NULL AND completed_at >= started_at)),
            CHECK ((state = 'COMPLETE') = (completed_at IS NOT NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the answers table
///
/// At most one answer per (test link, question).
pub async fn create_answers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            guid TEXT PRIMARY KEY,
            test_link_id TEXT NOT NULL REFERENCES test_links(guid) ON DELETE CASCADE,
            question_number INTEGER NOT NULL CHECK (question_number BETWEEN 1 AND 28),
            most_like TEXT NOT NULL CHECK (most_like IN ('D', 'I', 'S', 'C')),
            least_like TEXT NOT NULL CHECK (least_like IN ('D', 'I', 'S', 'C')),
            created_at TIMESTAMP NOT NULL,
            CHECK (most_like <> least_like),
            UNIQUE (test_link_id, question_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the scores table
///
/// At most one score per test link; writes are upserts on `test_link_id`.
pub async fn create_scores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scores (
            guid TEXT PRIMARY KEY,
            test_link_id TEXT NOT NULL UNIQUE REFERENCES test_links(guid) ON DELETE CASCADE,
            d_score INTEGER NOT NULL CHECK (d_score >= 0),
            i_score INTEGER NOT NULL CHECK (i_score >= 0),
            s_score INTEGER NOT NULL CHECK (s_score >= 0),
            c_score INTEGER NOT NULL CHECK (c_score >= 0),
            primary_type TEXT NOT NULL CHECK (primary_type IN ('D', 'I', 'S', 'C')),
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_test_links_respondent_id ON test_links(respondent_id)",
        "CREATE INDEX IF NOT EXISTS idx_test_links_state ON test_links(state)",
        "CREATE INDEX IF NOT EXISTS idx_test_links_created_at ON test_links(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_scores_primary_type ON scores(primary_type)",
    ];

    for sql in indexes {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
