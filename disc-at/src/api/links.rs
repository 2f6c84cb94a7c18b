//! Test link issuing endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::workflow::{self, CreatedLink};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub name: String,
}

/// POST /api/links
///
/// Resolves (or creates) the respondent by name and issues a new link.
pub async fn create_link(
    State(state): State<AppState>,
    Json(request): Json<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<CreatedLink>)> {
    let created = workflow::create_test_link(&state.db, &request.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
