//! Common error types for the DISC assessment service

use thiserror::Error;

use crate::disc::TestState;

/// Common result type for DISC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the scoring engine, the submission processor
/// and the test session state machine
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown token or respondent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token presented by a respondent who does not own the test link
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Resubmission attempt against a completed test link
    #[error("Test already completed: {0}")]
    AlreadyCompleted(String),

    /// Guarded lifecycle transition attempted from the wrong state
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: TestState, to: TestState },

    /// Submitted batch does not cover exactly questions 1..=28
    #[error("Incomplete batch: {found} entries supplied, missing questions {missing:?}")]
    IncompleteBatch { found: usize, missing: Vec<u32> },

    /// One entry of a submitted batch is unusable
    #[error("Malformed answer for question {question}: {reason}")]
    MalformedAnswer { question: u32, reason: String },

    /// Scoring engine input is not a complete, well-formed answer set
    #[error("Incomplete scoring input: {0}")]
    IncompleteInput(String),

    /// Computed total deviates from 4 points per scored answer
    #[error("Score integrity violated: expected total {expected}, computed {actual}")]
    ScoreIntegrity { expected: u32, actual: u32 },

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Client-side data defects the caller can fix by re-prompting
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::IncompleteBatch { .. } | Error::MalformedAnswer { .. }
        )
    }

    pub(crate) fn malformed(question: u32, reason: impl Into<String>) -> Self {
        Error::MalformedAnswer {
            question,
            reason: reason.into(),
        }
    }
}
