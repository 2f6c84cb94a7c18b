//! Database models

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::disc::{Axis, TestState};
use crate::scoring::AxisScores;

/// A test-taker, deduplicated by name fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Respondent {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub name_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// One administration of the questionnaire ("test link")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestLink {
    pub id: Uuid,
    pub respondent_id: Uuid,
    pub token: String,
    pub state: TestState,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TestLink {
    /// Whether `respondent_id` owns this link
    pub fn is_owned_by(&self, respondent_id: Uuid) -> bool {
        self.respondent_id == respondent_id
    }
}

/// Persisted result of a completed test link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub test_link_id: Uuid,
    #[serde(flatten)]
    pub scores: AxisScores,
    pub primary_type: Axis,
    pub created_at: DateTime<Utc>,
}
