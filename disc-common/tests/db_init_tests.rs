//! Integration tests for database initialization and schema constraints
//!
//! Tests cover:
//! - Automatic database creation with default schema
//! - Idempotent re-open of an existing database
//! - Storage-level invariants (state values, answer pairs, one score per link)

use disc_common::config::DatabaseConfig;
use disc_common::db::{get_schema_version, init_database, init_memory_database, CURRENT_SCHEMA_VERSION};
use sqlx::SqlitePool;

const T0: &str = "2026-01-01T00:00:00.000000Z";
const T1: &str = "2026-01-01T00:10:00.000000Z";

async fn seed_link(pool: &SqlitePool, link: &str, state: &str, started: Option<&str>, completed: Option<&str>) {
    sqlx::query("INSERT OR IGNORE INTO respondents (guid, name, name_fingerprint, created_at) VALUES ('r1', 'Kim', 'fp-kim', ?)")
        .bind(T0)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO test_links (guid, respondent_id, token, state, started_at, completed_at, created_at) VALUES (?, 'r1', ?, ?, ?, ?, ?)",
    )
    .bind(link)
    .bind(format!("tok{:0>13}", link))
    .bind(state)
    .bind(started)
    .bind(completed)
    .bind(T0)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("disc.db");

    let pool = init_database(&DatabaseConfig::at(&db_path)).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::at(dir.path().join("disc.db"));

    let pool1 = init_database(&config).await.unwrap();
    sqlx::query("INSERT INTO respondents (guid, name, name_fingerprint, created_at) VALUES ('r1', 'Kim', 'fp', ?)")
        .bind(T0)
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&config).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM respondents")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1, "Existing data must survive re-initialization");
    assert_eq!(get_schema_version(&pool2).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_all_tables_exist() {
    let pool = init_memory_database().await.unwrap();

    for table in ["respondents", "test_links", "answers", "scores", "schema_version"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Table {} missing", table);
    }
}

#[tokio::test]
async fn test_state_check_rejects_unknown_values() {
    let pool = init_memory_database().await.unwrap();
    sqlx::query("INSERT INTO respondents (guid, name, name_fingerprint, created_at) VALUES ('r1', 'Kim', 'fp', ?)")
        .bind(T0)
        .execute(&pool)
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO test_links (guid, respondent_id, token, state, created_at) VALUES ('l1', 'r1', 'tok', 'RUNNING', ?)",
    )
    .bind(T0)
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_completion_must_not_precede_start() {
    let pool = init_memory_database().await.unwrap();
    seed_link(&pool, "ok", "COMPLETE", Some(T0), Some(T1)).await;

    let result = sqlx::query(
        "INSERT INTO test_links (guid, respondent_id, token, state, started_at, completed_at, created_at) VALUES ('bad', 'r1', 'tokbad', 'COMPLETE', ?, ?, ?)",
    )
    .bind(T1)
    .bind(T0)
    .bind(T0)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "completed_at < started_at must be rejected");

    let result = sqlx::query(
        "INSERT INTO test_links (guid, respondent_id, token, state, created_at) VALUES ('bad2', 'r1', 'tokbad2', 'COMPLETE', ?)",
    )
    .bind(T0)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "COMPLETE without timestamps must be rejected");
}

#[tokio::test]
async fn test_answer_constraints() {
    let pool = init_memory_database().await.unwrap();
    seed_link(&pool, "l1", "IN_PROGRESS", Some(T0), None).await;

    let insert = |guid: &'static str, q: i64, most: &'static str, least: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query(
                "INSERT INTO answers (guid, test_link_id, question_number, most_like, least_like, created_at) VALUES (?, 'l1', ?, ?, ?, ?)",
            )
            .bind(guid)
            .bind(q)
            .bind(most)
            .bind(least)
            .bind(T0)
            .execute(&pool)
            .await
        }
    };

    assert!(insert("a1", 1, "D", "I").await.is_ok());
    assert!(insert("a2", 1, "S", "C").await.is_err(), "duplicate question");
    assert!(insert("a3", 2, "D", "D").await.is_err(), "identical pair");
    assert!(insert("a4", 29, "D", "I").await.is_err(), "out of range");
    assert!(insert("a5", 3, "X", "I").await.is_err(), "unknown axis");
}

#[tokio::test]
async fn test_one_score_per_link() {
    let pool = init_memory_database().await.unwrap();
    seed_link(&pool, "l1", "COMPLETE", Some(T0), Some(T1)).await;

    let insert = |guid: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query(
                "INSERT INTO scores (guid, test_link_id, d_score, i_score, s_score, c_score, primary_type, created_at) VALUES (?, 'l1', 56, 0, 28, 28, 'D', ?)",
            )
            .bind(guid)
            .bind(T1)
            .execute(&pool)
            .await
        }
    };

    assert!(insert("s1").await.is_ok());
    assert!(insert("s2").await.is_err());
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let pool = init_memory_database().await.unwrap();
    let result = sqlx::query(
        "INSERT INTO answers (guid, test_link_id, question_number, most_like, least_like, created_at) VALUES ('a', 'missing', 1, 'D', 'I', ?)",
    )
    .bind(T0)
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
