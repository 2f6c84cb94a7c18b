//! Result retrieval
//!
//! Read-only except for one repair: a completed test whose score row is
//! missing gets its score recomputed from the stored answers.

use chrono::{DateTime, Utc};
use disc_common::db::Score;
use disc_common::descriptions::{describe, TypeDescription};
use disc_common::scoring::{self, AnswerDistribution};
use disc_common::{time, Answer, Percentages, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::find_link;
use crate::db::{answers, respondents, scores};

/// Everything the result page shows for a completed test
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub respondent_name: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Score,
    pub percentages: Percentages,
    pub description: &'static TypeDescription,
    pub distribution: AnswerDistribution,
}

/// The persisted score, if the test link is complete
pub async fn get_score(pool: &SqlitePool, token: &str) -> Result<Option<Score>> {
    let link = find_link(pool, token).await?;
    if !link.state.is_terminal() {
        debug!(test_link_id = %link.id, state = %link.state, "No score before completion");
        return Ok(None);
    }
    scores::load_for_link(pool, link.id).await
}

/// Full result view of a completed test link, `None` while not complete
pub async fn get_result(pool: &SqlitePool, token: &str) -> Result<Option<ResultView>> {
    let link = find_link(pool, token).await?;
    if !link.state.is_terminal() {
        return Ok(None);
    }

    let stored = answers::load_for_link(pool, link.id).await?;

    let score = match scores::load_for_link(pool, link.id).await? {
        Some(score) => score,
        None => {
            warn!(test_link_id = %link.id, "Score missing for completed test, recomputing");
            let card = scoring::score(&stored)?;
            let now = time::now();
            scores::upsert(pool, link.id, &card, &now).await?;
            Score {
                test_link_id: link.id,
                scores: card.scores,
                primary_type: card.primary_type,
                created_at: now,
            }
        }
    };

    let respondent_name = respondents::load(pool, link.respondent_id)
        .await?
        .map(|r| r.name)
        .unwrap_or_default();

    Ok(Some(ResultView {
        respondent_name,
        completed_at: link.completed_at,
        percentages: score.scores.percentages(),
        description: describe(score.primary_type),
        distribution: scoring::answer_distribution(&stored),
        score,
    }))
}

/// Committed answers of a test link in question order
pub async fn get_answers(pool: &SqlitePool, token: &str) -> Result<Vec<Answer>> {
    let link = find_link(pool, token).await?;
    answers::load_for_link(pool, link.id).await
}
