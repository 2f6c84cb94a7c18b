//! Respondent database operations

use disc_common::db::Respondent;
use disc_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_guid;

/// Insert a respondent unless one with the same fingerprint exists, then load it
///
/// Concurrent callers with the same fingerprint converge on a single row:
/// the losing insert is ignored by the unique constraint.
pub async fn insert_or_get(pool: &SqlitePool, name: &str, fingerprint: &str) -> Result<Respondent> {
    let guid = disc_common::ids::generate().to_string();
    let created_at = time::to_storage(&time::now());

    sqlx::query(
        r#"
        INSERT INTO respondents (guid, name, name_fingerprint, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(name_fingerprint) DO NOTHING
        "#,
    )
    .bind(&guid)
    .bind(name)
    .bind(fingerprint)
    .bind(&created_at)
    .execute(pool)
    .await?;

    find_by_fingerprint(pool, fingerprint).await?.ok_or_else(|| {
        Error::Internal(format!("Respondent {} vanished after insert", fingerprint))
    })
}

/// Load respondent by name fingerprint
pub async fn find_by_fingerprint(pool: &SqlitePool, fingerprint: &str) -> Result<Option<Respondent>> {
    let row = sqlx::query(
        "SELECT guid, name, name_fingerprint, created_at FROM respondents WHERE name_fingerprint = ?",
    )
    .bind(fingerprint)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(respondent_from_row).transpose()
}

/// Load respondent by id
pub async fn load(pool: &SqlitePool, id: Uuid) -> Result<Option<Respondent>> {
    let row = sqlx::query(
        "SELECT guid, name, name_fingerprint, created_at FROM respondents WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(respondent_from_row).transpose()
}

fn respondent_from_row(row: &SqliteRow) -> Result<Respondent> {
    let guid: String = row.get("guid");
    let created_at: String = row.get("created_at");

    Ok(Respondent {
        id: parse_guid(&guid, "respondents.guid")?,
        name: row.get("name"),
        name_fingerprint: row.get("name_fingerprint"),
        created_at: time::from_storage(&created_at)?,
    })
}
