//! Submission processor
//!
//! Turns a raw batch of 28 forced choices into committed answers, a score
//! and a completed test link, all in one transaction.
//!
//! # Protocol
//!
//! 1. Preconditions, checked before any write: ownership, state, batch
//!    shape, then each entry.
//! 2. One transaction:
//!    - delete existing answers for the link
//!    - insert the 28 new answers
//!    - score the answers as read back inside the transaction
//!    - upsert the score
//!    - guarded `IN_PROGRESS -> COMPLETE`
//!
//! The first statement of the transaction is a write, so SQLite grants the
//! write lock before anything is read and a concurrent submitter waits on
//! the busy timeout. If the guarded transition matches no row the whole
//! transaction is rolled back.

use disc_common::db::Score;
use disc_common::disc::QUESTION_COUNT;
use disc_common::{scoring, time, Answer, Error, Result, TestState};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{check_owner, find_link};
use crate::db::{answers, scores, test_links};

/// Question number recorded for a key that is not a number
///
/// It lies outside `1..=28`, so the batch fails the shape check.
pub const UNPARSEABLE_QUESTION: u32 = 0;

/// Raw labels for one question, as submitted by a form
///
/// Decoding never fails on content. A label that is not a string is kept
/// as its JSON text and an entry that is not an object has no labels, so
/// both are reported by [`validate_batch`] against their question number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerEntry {
    pub most_like: Option<String>,
    pub least_like: Option<String>,
}

impl AnswerEntry {
    pub fn new(most_like: &str, least_like: &str) -> Self {
        Self {
            most_like: Some(most_like.to_string()),
            least_like: Some(least_like.to_string()),
        }
    }
}

/// A submitted batch: question number to raw entry
///
/// Entries are kept in arrival order and repeated question numbers are
/// preserved, so shape validation can see them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBatch {
    entries: Vec<(u32, AnswerEntry)>,
}

impl AnswerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u32, entry: AnswerEntry) {
        self.entries.push((question, entry));
    }

    /// Remove every entry for `question`
    pub fn remove(&mut self, question: u32) {
        self.entries.retain(|(q, _)| *q != question);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u32, AnswerEntry)] {
        &self.entries
    }
}

impl<'de> Deserialize<'de> for AnswerEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self {
            most_like: raw_label(&value, "mostLike", "most_like"),
            least_like: raw_label(&value, "leastLike", "least_like"),
        })
    }
}

fn raw_label(entry: &Value, key: &str, alias: &str) -> Option<String> {
    match entry.get(key).or_else(|| entry.get(alias))? {
        Value::Null => None,
        Value::String(label) => Some(label.clone()),
        other => Some(other.to_string()),
    }
}

impl FromIterator<(u32, AnswerEntry)> for AnswerBatch {
    fn from_iter<T: IntoIterator<Item = (u32, AnswerEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Deserializes from a JSON object keyed by question number (`{"1": {...}}`)
impl<'de> Deserialize<'de> for AnswerBatch {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BatchVisitor;

        impl<'de> Visitor<'de> for BatchVisitor {
            type Value = AnswerBatch;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from question number to answer entry")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<AnswerBatch, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut batch = AnswerBatch::new();
                while let Some(key) = map.next_key::<String>()? {
                    let question = key.trim().parse::<u32>().unwrap_or_else(|_| {
                        debug!(key = %key, "Question key is not a number");
                        UNPARSEABLE_QUESTION
                    });
                    batch.insert(question, map.next_value()?);
                }
                Ok(batch)
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

/// Check batch shape and every entry, returning answers in question order
///
/// - `IncompleteBatch` unless the question numbers are exactly `1..=28`,
///   each once
/// - `MalformedAnswer` for the first entry (by question number) with a
///   missing, unknown or self-contradictory label
pub fn validate_batch(batch: &AnswerBatch) -> Result<Vec<Answer>> {
    let seen: BTreeSet<u32> = batch
        .entries()
        .iter()
        .map(|(q, _)| *q)
        .filter(|q| (1..=QUESTION_COUNT).contains(q))
        .collect();

    if batch.len() != QUESTION_COUNT as usize || seen.len() != QUESTION_COUNT as usize {
        let missing: Vec<u32> = (1..=QUESTION_COUNT).filter(|q| !seen.contains(q)).collect();
        debug!(found = batch.len(), ?missing, "Rejected incomplete batch");
        return Err(Error::IncompleteBatch {
            found: batch.len(),
            missing,
        });
    }

    let mut entries: Vec<&(u32, AnswerEntry)> = batch.entries().iter().collect();
    entries.sort_by_key(|(q, _)| *q);

    entries
        .into_iter()
        .map(|(question, entry)| {
            Answer::parse(*question, entry.most_like.as_deref(), entry.least_like.as_deref())
        })
        .collect()
}

/// Submit a complete batch for a test link and return the committed score
///
/// On any error no answer, score or state change from this call is visible.
pub async fn submit_answers(
    pool: &SqlitePool,
    token: &str,
    respondent_id: Uuid,
    batch: &AnswerBatch,
) -> Result<Score> {
    let link = find_link(pool, token).await?;
    check_owner(&link, respondent_id)?;

    match link.state {
        TestState::InProgress => {}
        TestState::Complete => {
            warn!(test_link_id = %link.id, "Rejected resubmission of a completed test");
            return Err(already_completed(link.id));
        }
        TestState::NotStarted => {
            warn!(test_link_id = %link.id, "Rejected submission for a test that was never started");
            return Err(Error::InvalidTransition {
                from: TestState::NotStarted,
                to: TestState::Complete,
            });
        }
    }

    let answers = validate_batch(batch)?;
    let now = time::now();

    let mut tx = pool.begin().await?;

    let replaced = answers::delete_for_link(&mut *tx, link.id).await?;
    if replaced > 0 {
        debug!(test_link_id = %link.id, replaced, "Replacing previously stored answers");
    }

    let inserted = answers::insert_batch(&mut *tx, link.id, &answers, &now).await?;
    if inserted != u64::from(QUESTION_COUNT) {
        return Err(Error::Internal(format!(
            "inserted {} answers for test link {}, expected {}",
            inserted, link.id, QUESTION_COUNT
        )));
    }

    let stored = answers::load_for_link(&mut *tx, link.id).await?;
    let card = scoring::score(&stored)?;

    scores::upsert(&mut *tx, link.id, &card, &now).await?;

    if !test_links::mark_complete(&mut *tx, link.id, &now).await? {
        tx.rollback().await?;
        return Err(transition_failure(pool, link.id).await?);
    }

    tx.commit().await?;

    info!(
        test_link_id = %link.id,
        answers = stored.len(),
        d = card.scores.d,
        i = card.scores.i,
        s = card.scores.s,
        c = card.scores.c,
        primary_type = %card.primary_type,
        "Submission committed"
    );

    Ok(Score {
        test_link_id: link.id,
        scores: card.scores,
        primary_type: card.primary_type,
        created_at: now,
    })
}

fn already_completed(test_link_id: Uuid) -> Error {
    Error::AlreadyCompleted(format!("test link {}", test_link_id))
}

/// Classify a guarded completion that matched no row
async fn transition_failure(pool: &SqlitePool, test_link_id: Uuid) -> Result<Error> {
    let current = test_links::load(pool, test_link_id).await?;
    Ok(match current.map(|link| link.state) {
        Some(TestState::Complete) => {
            warn!(%test_link_id, "Concurrent submission completed the test first");
            already_completed(test_link_id)
        }
        Some(from) => Error::InvalidTransition {
            from,
            to: TestState::Complete,
        },
        None => Error::NotFound("unknown test link".to_string()),
    })
}
