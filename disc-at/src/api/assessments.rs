//! Questionnaire endpoints addressed by access token
//!
//! Start and submit identify the respondent by display name. The name is
//! only looked up, never created here; an unknown name is treated exactly
//! like a token owned by someone else.

use axum::{
    extract::{Path, State},
    Json,
};
use disc_common::db::{Score, TestLink};
use disc_common::{Answer, Error, Percentages};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{page_layout, PageLayout};
use crate::workflow::{self, AnswerBatch, Progress, ResultView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub name: String,
    /// Questionnaire page to lay out, clamped to the valid range
    #[serde(default)]
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub link: TestLink,
    /// Absent once the test is complete; the result endpoint takes over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<PageLayout>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    pub answers: AnswerBatch,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub score: Score,
    pub percentages: Percentages,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: Option<Score>,
}

async fn identify(pool: &SqlitePool, name: &str) -> ApiResult<Uuid> {
    workflow::find_respondent(pool, name)
        .await?
        .map(|respondent| respondent.id)
        .ok_or_else(|| ApiError::from(Error::AccessDenied("unknown respondent name".to_string())))
}

/// POST /api/tests/:token/start
pub async fn start_test(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<StartRequest>,
) -> ApiResult<Json<StartResponse>> {
    let respondent_id = identify(&state.db, &request.name).await?;
    let link = workflow::start_or_resume_test(&state.db, &token, respondent_id).await?;

    let layout = if link.state.is_terminal() {
        None
    } else {
        Some(page_layout(request.page.unwrap_or(1)))
    };

    Ok(Json(StartResponse { link, layout }))
}

/// POST /api/tests/:token/submit
pub async fn submit_test(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let respondent_id = identify(&state.db, &request.name).await?;
    let score = workflow::submit_answers(&state.db, &token, respondent_id, &request.answers).await?;

    Ok(Json(SubmitResponse {
        percentages: score.scores.percentages(),
        score,
    }))
}

/// GET /api/tests/:token/score
///
/// `{"score": null}` until the test is complete.
pub async fn get_score(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ScoreResponse>> {
    let score = workflow::get_score(&state.db, &token).await?;
    Ok(Json(ScoreResponse { score }))
}

/// GET /api/tests/:token/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<Progress>> {
    Ok(Json(workflow::get_progress(&state.db, &token).await?))
}

/// GET /api/tests/:token/result
pub async fn get_result(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ResultView>> {
    workflow::get_result(&state.db, &token)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotComplete("answer all questions first".to_string()))
}

/// GET /api/tests/:token/answers
pub async fn get_answers(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<Vec<Answer>>> {
    Ok(Json(workflow::get_answers(&state.db, &token).await?))
}
