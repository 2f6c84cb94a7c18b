//! Test link database operations
//!
//! State changes are conditional updates (`WHERE state = <expected>`); the
//! returned flag reports whether the guard held.

use chrono::{DateTime, Utc};
use disc_common::db::TestLink;
use disc_common::{time, Error, Result, TestState};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, to_u32};

const SELECT_BY_TOKEN: &str = "SELECT guid, respondent_id, token, state, started_at, completed_at, created_at \
     FROM test_links WHERE token = ?";
const SELECT_BY_ID: &str = "SELECT guid, respondent_id, token, state, started_at, completed_at, created_at \
     FROM test_links WHERE guid = ?";

/// Insert a new test link
///
/// A token collision surfaces as a `Database` error whose
/// `is_unique_violation()` is true.
pub async fn insert(pool: &SqlitePool, link: &TestLink) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO test_links (guid, respondent_id, token, state, started_at, completed_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(link.id.to_string())
    .bind(link.respondent_id.to_string())
    .bind(&link.token)
    .bind(link.state.as_str())
    .bind(link.started_at.as_ref().map(time::to_storage))
    .bind(link.completed_at.as_ref().map(time::to_storage))
    .bind(time::to_storage(&link.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load test link by access token
pub async fn load_by_token<'e, E>(executor: E, token: &str) -> Result<Option<TestLink>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(SELECT_BY_TOKEN)
        .bind(token)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(link_from_row).transpose()
}

/// Load test link by id
pub async fn load<'e, E>(executor: E, id: Uuid) -> Result<Option<TestLink>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(SELECT_BY_ID)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(link_from_row).transpose()
}

/// `NOT_STARTED -> IN_PROGRESS`, stamping `started_at`
pub async fn mark_started(pool: &SqlitePool, id: Uuid, started_at: &DateTime<Utc>) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE test_links
        SET state = ?, started_at = ?
        WHERE guid = ? AND state = ?
        "#,
    )
    .bind(TestState::InProgress.as_str())
    .bind(time::to_storage(started_at))
    .bind(id.to_string())
    .bind(guard(TestState::InProgress)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// `IN_PROGRESS -> COMPLETE`, stamping `completed_at`
///
/// The stored completion time is never earlier than `started_at`.
pub async fn mark_complete<'e, E>(executor: E, id: Uuid, completed_at: &DateTime<Utc>) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE test_links
        SET state = ?, completed_at = MAX(started_at, ?)
        WHERE guid = ? AND state = ?
        "#,
    )
    .bind(TestState::Complete.as_str())
    .bind(time::to_storage(completed_at))
    .bind(id.to_string())
    .bind(guard(TestState::Complete)?)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Stored state a guarded update into `to` must match
fn guard(to: TestState) -> Result<&'static str> {
    TestState::predecessor_of(to)
        .map(|from| from.as_str())
        .ok_or_else(|| Error::Internal(format!("no transition leads into {}", to)))
}

/// Number of links a respondent owns, and how many of them are complete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LinkHistory {
    pub link_count: u32,
    pub completed_count: u32,
}

pub async fn history_for_respondent(pool: &SqlitePool, respondent_id: Uuid) -> Result<LinkHistory> {
    let (total, completed): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(CASE WHEN state = ? THEN 1 ELSE 0 END), 0)
        FROM test_links
        WHERE respondent_id = ?
        "#,
    )
    .bind(TestState::Complete.as_str())
    .bind(respondent_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(LinkHistory {
        link_count: to_u32(total, "link count")?,
        completed_count: to_u32(completed, "completed count")?,
    })
}

fn link_from_row(row: &SqliteRow) -> Result<TestLink> {
    let guid: String = row.get("guid");
    let respondent_id: String = row.get("respondent_id");
    let state: String = row.get("state");
    let started_at: Option<String> = row.get("started_at");
    let completed_at: Option<String> = row.get("completed_at");
    let created_at: String = row.get("created_at");

    Ok(TestLink {
        id: parse_guid(&guid, "test_links.guid")?,
        respondent_id: parse_guid(&respondent_id, "test_links.respondent_id")?,
        token: row.get("token"),
        state: state.parse::<TestState>()?,
        started_at: time::from_storage_opt(started_at.as_deref())?,
        completed_at: time::from_storage_opt(completed_at.as_deref())?,
        created_at: time::from_storage(&created_at)?,
    })
}
