//! Assessment workflow
//!
//! The test session state machine, the submission processor and result
//! retrieval. Every operation re-reads authoritative state from storage;
//! nothing about a test link is cached between calls.

pub mod links;
pub mod results;
pub mod session;
pub mod submission;

pub use links::{create_test_link, find_respondent, resolve_respondent, CreatedLink, MAX_TOKEN_ATTEMPTS};
pub use results::{get_answers, get_result, get_score, ResultView};
pub use session::{get_progress, start_or_resume_test, Progress};
pub use submission::{submit_answers, validate_batch, AnswerBatch, AnswerEntry};

use disc_common::db::TestLink;
use disc_common::{ids, Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::test_links;

/// Look up a test link by its access token
///
/// Tokens that cannot have been issued are rejected without a lookup.
pub(crate) async fn find_link(pool: &SqlitePool, token: &str) -> Result<TestLink> {
    if !ids::is_well_formed_token(token) {
        debug!("Rejected malformed token");
        return Err(Error::NotFound("unknown test link".to_string()));
    }

    test_links::load_by_token(pool, token)
        .await?
        .ok_or_else(|| Error::NotFound("unknown test link".to_string()))
}

/// Verify that `respondent_id` owns `link`
pub(crate) fn check_owner(link: &TestLink, respondent_id: Uuid) -> Result<()> {
    if link.is_owned_by(respondent_id) {
        return Ok(());
    }
    warn!(
        test_link_id = %link.id,
        respondent_id = %respondent_id,
        "Test link presented by a respondent who does not own it"
    );
    Err(Error::AccessDenied(format!(
        "test link {} is not owned by respondent {}",
        link.id, respondent_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use disc_common::{time, TestState};

    fn link_owned_by(owner: Uuid) -> TestLink {
        let now = time::now();
        TestLink {
            id: Uuid::new_v4(),
            respondent_id: owner,
            token: ids::generate_token(),
            state: TestState::NotStarted,
            started_at: None,
            completed_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_check_owner() {
        let owner = Uuid::new_v4();
        let link = link_owned_by(owner);
        assert!(check_owner(&link, owner).is_ok());
        assert!(matches!(
            check_owner(&link, Uuid::new_v4()),
            Err(Error::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_token_is_not_found() {
        let pool = disc_common::db::init_memory_database().await.unwrap();
        for token in ["", "short", "has spaces in it!", "AAAABBBBCCCCDDDDE"] {
            assert!(matches!(find_link(&pool, token).await, Err(Error::NotFound(_))));
        }
    }
}
