//! Answer database operations
//!
//! Answers are only ever written as a full batch inside the submission
//! transaction; there is no per-page partial save.

use chrono::{DateTime, Utc};
use disc_common::{ids, time, Answer, Axis, Error, Result};
use sqlx::{Executor, QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::to_u32;

/// Delete every answer of a test link, returning the number removed
pub async fn delete_for_link<'e, E>(executor: E, test_link_id: Uuid) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM answers WHERE test_link_id = ?")
        .bind(test_link_id.to_string())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Insert answers in one multi-row statement, returning the number inserted
pub async fn insert_batch<'e, E>(
    executor: E,
    test_link_id: Uuid,
    answers: &[Answer],
    created_at: &DateTime<Utc>,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    if answers.is_empty() {
        return Ok(0);
    }

    let link = test_link_id.to_string();
    let created_at = time::to_storage(created_at);

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO answers (guid, test_link_id, question_number, most_like, least_like, created_at) ",
    );
    builder.push_values(answers, |mut row, answer| {
        row.push_bind(ids::generate().to_string())
            .push_bind(link.clone())
            .push_bind(i64::from(answer.question()))
            .push_bind(answer.most_like().as_str())
            .push_bind(answer.least_like().as_str())
            .push_bind(created_at.clone());
    });

    let result = builder.build().execute(executor).await?;
    Ok(result.rows_affected())
}

/// Load the answers of a test link ordered by question number
///
/// A stored row that no longer forms a valid answer is reported as
/// `IncompleteInput`, since it cannot be fed to the scoring engine.
pub async fn load_for_link<'e, E>(executor: E, test_link_id: Uuid) -> Result<Vec<Answer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT question_number, most_like, least_like
        FROM answers
        WHERE test_link_id = ?
        ORDER BY question_number
        "#,
    )
    .bind(test_link_id.to_string())
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            let question = to_u32(row.get::<i64, _>("question_number"), "answers.question_number")?;
            let most_like: String = row.get("most_like");
            let least_like: String = row.get("least_like");
            stored_answer(question, &most_like, &least_like)
        })
        .collect()
}

/// Number of committed answers for a test link
pub async fn count_for_link<'e, E>(executor: E, test_link_id: Uuid) -> Result<u32>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE test_link_id = ?")
        .bind(test_link_id.to_string())
        .fetch_one(executor)
        .await?;

    to_u32(count, "answer count")
}

fn stored_answer(question: u32, most_like: &str, least_like: &str) -> Result<Answer> {
    let unusable = |e: Error| {
        Error::IncompleteInput(format!("stored answer for question {} is unusable: {}", question, e))
    };
    let most_like: Axis = most_like.parse().map_err(unusable)?;
    let least_like: Axis = least_like.parse().map_err(unusable)?;
    Answer::new(question, most_like, least_like).map_err(unusable)
}
