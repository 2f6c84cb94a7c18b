//! Score database operations

use chrono::{DateTime, Utc};
use disc_common::db::Score;
use disc_common::{ids, time, AxisScores, Axis, Result, ScoreCard};
use sqlx::{Executor, Row, Sqlite};
use uuid::Uuid;

use super::to_u32;

/// Insert or overwrite the score of a test link in a single statement
///
/// Relies on the unique index on `scores.test_link_id`; there is never a
/// separate existence check.
pub async fn upsert<'e, E>(
    executor: E,
    test_link_id: Uuid,
    card: &ScoreCard,
    created_at: &DateTime<Utc>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO scores (guid, test_link_id, d_score, i_score, s_score, c_score, primary_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(test_link_id) DO UPDATE SET
            d_score = excluded.d_score,
            i_score = excluded.i_score,
            s_score = excluded.s_score,
            c_score = excluded.c_score,
            primary_type = excluded.primary_type,
            created_at = excluded.created_at
        "#,
    )
    .bind(ids::generate().to_string())
    .bind(test_link_id.to_string())
    .bind(i64::from(card.scores.d))
    .bind(i64::from(card.scores.i))
    .bind(i64::from(card.scores.s))
    .bind(i64::from(card.scores.c))
    .bind(card.primary_type.as_str())
    .bind(time::to_storage(created_at))
    .execute(executor)
    .await?;

    Ok(())
}

/// Load the score of a test link
pub async fn load_for_link<'e, E>(executor: E, test_link_id: Uuid) -> Result<Option<Score>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT d_score, i_score, s_score, c_score, primary_type, created_at
        FROM scores
        WHERE test_link_id = ?
        "#,
    )
    .bind(test_link_id.to_string())
    .fetch_optional(executor)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let scores = AxisScores::new(
        to_u32(row.get("d_score"), "scores.d_score")?,
        to_u32(row.get("i_score"), "scores.i_score")?,
        to_u32(row.get("s_score"), "scores.s_score")?,
        to_u32(row.get("c_score"), "scores.c_score")?,
    );
    let primary_type: String = row.get("primary_type");
    let created_at: String = row.get("created_at");

    Ok(Some(Score {
        test_link_id,
        scores,
        primary_type: primary_type.parse::<Axis>()?,
        created_at: time::from_storage(&created_at)?,
    }))
}
