//! # DISC Common Library
//!
//! Shared code for the DISC assessment service including:
//! - Axis codes, validated answers and test-link lifecycle states
//! - The scoring engine (points, primary type, percentage view)
//! - Primary-type descriptions
//! - Respondent name fingerprinting and access-token generation
//! - Database initialization and schema migrations
//! - Configuration loading

pub mod config;
pub mod db;
pub mod descriptions;
pub mod disc;
pub mod error;
pub mod fingerprint;
pub mod ids;
pub mod scoring;
pub mod time;

pub use disc::{Answer, Axis, TestState};
pub use error::{Error, Result};
pub use scoring::{AxisScores, Percentages, ScoreCard};
