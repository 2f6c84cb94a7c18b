//! Test session state machine
//!
//! `NOT_STARTED -> IN_PROGRESS -> COMPLETE`. Starting is idempotent: a
//! repeated start on a running or finished link changes nothing. Completion
//! belongs to the submission processor.

use disc_common::db::TestLink;
use disc_common::disc::QUESTION_COUNT;
use disc_common::{time, Error, Result, TestState};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{check_owner, find_link};
use crate::db::{answers, test_links};

/// Open a test link for its owner, starting it on first access
///
/// Returns the link as stored after the call. `started_at` is stamped only
/// by the call that performs the `NOT_STARTED -> IN_PROGRESS` transition.
pub async fn start_or_resume_test(pool: &SqlitePool, token: &str, respondent_id: Uuid) -> Result<TestLink> {
    let link = find_link(pool, token).await?;
    check_owner(&link, respondent_id)?;

    if !link.state.can_transition_to(TestState::InProgress) {
        debug!(test_link_id = %link.id, state = %link.state, "Resuming test link");
        return Ok(link);
    }

    if test_links::mark_started(pool, link.id, &time::now()).await? {
        info!(test_link_id = %link.id, "Test started");
    } else {
        // Another request started it between our read and our update
        debug!(test_link_id = %link.id, "Start raced with a concurrent request");
    }

    test_links::load(pool, link.id)
        .await?
        .ok_or_else(|| Error::NotFound("unknown test link".to_string()))
}

/// Committed-answer progress of a test link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub state: TestState,
    pub answered_count: u32,
    pub total_questions: u32,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.answered_count == self.total_questions
    }
}

/// Read-only progress indicator
///
/// Answers are committed as one batch, so `answered_count` is either 0 or
/// the full questionnaire.
pub async fn get_progress(pool: &SqlitePool, token: &str) -> Result<Progress> {
    let link = find_link(pool, token).await?;
    let answered_count = answers::count_for_link(pool, link.id).await?;

    Ok(Progress {
        state: link.state,
        answered_count,
        total_questions: QUESTION_COUNT,
    })
}
