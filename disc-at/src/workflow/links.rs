//! Respondent resolution and test link creation

use disc_common::db::{Respondent, TestLink};
use disc_common::fingerprint::{name_fingerprint, validate_name};
use disc_common::{ids, time, Error, Result, TestState};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::test_links::{self, LinkHistory};
use crate::db::respondents;

/// Attempts at generating a token that is not already in use
pub const MAX_TOKEN_ATTEMPTS: u32 = 10;

/// A newly issued test link with its owner's history
#[derive(Debug, Clone, Serialize)]
pub struct CreatedLink {
    pub link: TestLink,
    pub respondent: Respondent,
    /// Totals after this link was added
    pub history: LinkHistory,
}

/// Get or create the respondent for a display name
pub async fn resolve_respondent(pool: &SqlitePool, name: &str) -> Result<Respondent> {
    let name = validate_name(name)?;
    let fingerprint = name_fingerprint(&name);
    respondents::insert_or_get(pool, &name, &fingerprint).await
}

/// Look up an existing respondent by display name, never creating one
pub async fn find_respondent(pool: &SqlitePool, name: &str) -> Result<Option<Respondent>> {
    let name = validate_name(name)?;
    respondents::find_by_fingerprint(pool, &name_fingerprint(&name)).await
}

/// Issue a new `NOT_STARTED` test link to the named respondent
pub async fn create_test_link(pool: &SqlitePool, name: &str) -> Result<CreatedLink> {
    let respondent = resolve_respondent(pool, name).await?;

    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
        let now = time::now();
        let link = TestLink {
            id: ids::generate(),
            respondent_id: respondent.id,
            token: ids::generate_token(),
            state: TestState::NotStarted,
            started_at: None,
            completed_at: None,
            created_at: now,
        };

        match test_links::insert(pool, &link).await {
            Ok(()) => {
                let history = test_links::history_for_respondent(pool, respondent.id).await?;
                info!(
                    test_link_id = %link.id,
                    respondent_id = %respondent.id,
                    links = history.link_count,
                    "Issued test link"
                );
                // Re-read so timestamps carry storage precision
                let link = test_links::load(pool, link.id)
                    .await?
                    .ok_or_else(|| Error::Internal(format!("Test link {} vanished after insert", link.id)))?;
                return Ok(CreatedLink {
                    link,
                    respondent,
                    history,
                });
            }
            Err(Error::Database(sqlx::Error::Database(db_err))) if db_err.is_unique_violation() => {
                debug!(attempt, "Token collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    warn!(attempts = MAX_TOKEN_ATTEMPTS, "Could not generate a unique token");
    Err(Error::Internal(format!(
        "no unique token after {} attempts",
        MAX_TOKEN_ATTEMPTS
    )))
}
