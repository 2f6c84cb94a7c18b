//! DISC domain primitives
//!
//! Axis codes, the validated forced-choice [`Answer`], and the lifecycle
//! state of a test link.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Number of items in the questionnaire
pub const QUESTION_COUNT: u32 = 28;

/// One of the four personality dimensions
///
/// Declaration order is the fixed tie-break priority: D, then I, then S, then C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Dominance
    D,
    /// Influence
    I,
    /// Steadiness
    S,
    /// Conscientiousness
    C,
}

impl Axis {
    /// All axes in tie-break priority order
    pub const ALL: [Axis; 4] = [Axis::D, Axis::I, Axis::S, Axis::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::D => "D",
            Axis::I => "I",
            Axis::S => "S",
            Axis::C => "C",
        }
    }

    /// Full dimension name
    pub fn name(&self) -> &'static str {
        match self {
            Axis::D => "Dominance",
            Axis::I => "Influence",
            Axis::S => "Steadiness",
            Axis::C => "Conscientiousness",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = Error;

    /// Accepts a single axis letter, case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Axis::D),
            "I" => Ok(Axis::I),
            "S" => Ok(Axis::S),
            "C" => Ok(Axis::C),
            other => Err(Error::InvalidInput(format!("Unknown axis code: {:?}", other))),
        }
    }
}

/// Lifecycle state of a test link
///
/// `NotStarted -> InProgress -> Complete`; `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestState {
    NotStarted,
    InProgress,
    Complete,
}

impl TestState {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TestState::NotStarted => "NOT_STARTED",
            TestState::InProgress => "IN_PROGRESS",
            TestState::Complete => "COMPLETE",
        }
    }

    /// The only state a guarded transition into `to` may start from
    pub fn predecessor_of(to: TestState) -> Option<TestState> {
        match to {
            TestState::NotStarted => None,
            TestState::InProgress => Some(TestState::NotStarted),
            TestState::Complete => Some(TestState::InProgress),
        }
    }

    pub fn can_transition_to(&self, to: TestState) -> bool {
        TestState::predecessor_of(to) == Some(*self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TestState::Complete)
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NOT_STARTED" => Ok(TestState::NotStarted),
            "IN_PROGRESS" => Ok(TestState::InProgress),
            "COMPLETE" => Ok(TestState::Complete),
            other => Err(Error::Internal(format!("Unknown test state in storage: {}", other))),
        }
    }
}

/// One respondent's forced choice for one questionnaire item
///
/// Construction guarantees the question number is in `1..=28` and the
/// most-like and least-like axes differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Answer {
    question: u32,
    most_like: Axis,
    least_like: Axis,
}

impl Answer {
    pub fn new(question: u32, most_like: Axis, least_like: Axis) -> Result<Self> {
        if !(1..=QUESTION_COUNT).contains(&question) {
            return Err(Error::malformed(
                question,
                format!("question number must be between 1 and {}", QUESTION_COUNT),
            ));
        }
        if most_like == least_like {
            return Err(Error::malformed(
                question,
                format!("most-like and least-like are both {}", most_like),
            ));
        }
        Ok(Self {
            question,
            most_like,
            least_like,
        })
    }

    /// Build an answer from raw labels as they arrive from a form
    pub fn parse(question: u32, most_like: Option<&str>, least_like: Option<&str>) -> Result<Self> {
        let most_like = parse_label(question, "most-like", most_like)?;
        let least_like = parse_label(question, "least-like", least_like)?;
        Answer::new(question, most_like, least_like)
    }

    pub fn question(&self) -> u32 {
        self.question
    }

    pub fn most_like(&self) -> Axis {
        self.most_like
    }

    pub fn least_like(&self) -> Axis {
        self.least_like
    }
}

fn parse_label(question: u32, which: &str, label: Option<&str>) -> Result<Axis> {
    match label.map(str::trim) {
        None | Some("") => Err(Error::malformed(question, format!("{} selection is missing", which))),
        Some(raw) => raw
            .parse::<Axis>()
            .map_err(|_| Error::malformed(question, format!("{} selection {:?} is not one of D/I/S/C", which, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_parse_is_case_insensitive() {
        assert_eq!("d".parse::<Axis>().unwrap(), Axis::D);
        assert_eq!(" C ".parse::<Axis>().unwrap(), Axis::C);
        assert!("X".parse::<Axis>().is_err());
        assert!("DI".parse::<Axis>().is_err());
    }

    #[test]
    fn test_axis_priority_order() {
        assert!(Axis::D < Axis::I && Axis::I < Axis::S && Axis::S < Axis::C);
    }

    #[test]
    fn test_state_round_trips_storage_strings() {
        for state in [TestState::NotStarted, TestState::InProgress, TestState::Complete] {
            assert_eq!(state.as_str().parse::<TestState>().unwrap(), state);
        }
        assert!("RUNNING".parse::<TestState>().is_err());
    }

    #[test]
    fn test_state_transitions() {
        assert!(TestState::NotStarted.can_transition_to(TestState::InProgress));
        assert!(TestState::InProgress.can_transition_to(TestState::Complete));
        assert!(!TestState::NotStarted.can_transition_to(TestState::Complete));
        assert!(!TestState::Complete.can_transition_to(TestState::InProgress));
        assert!(!TestState::Complete.can_transition_to(TestState::Complete));
        assert!(TestState::Complete.is_terminal());
        assert!(!TestState::InProgress.is_terminal());
    }

    #[test]
    fn test_answer_rejects_identical_pair() {
        let err = Answer::new(5, Axis::D, Axis::D).unwrap_err();
        assert!(matches!(err, Error::MalformedAnswer { question: 5, .. }));
    }

    #[test]
    fn test_answer_rejects_out_of_range_question() {
        assert!(Answer::new(0, Axis::D, Axis::I).is_err());
        assert!(Answer::new(29, Axis::D, Axis::I).is_err());
        assert!(Answer::new(28, Axis::D, Axis::I).is_ok());
    }

    #[test]
    fn test_answer_parse_reports_missing_and_unknown_labels() {
        let err = Answer::parse(7, Some("D"), None).unwrap_err();
        assert!(matches!(err, Error::MalformedAnswer { question: 7, ref reason } if reason.contains("least-like")));

        let err = Answer::parse(8, Some("Q"), Some("D")).unwrap_err();
        assert!(matches!(err, Error::MalformedAnswer { question: 8, ref reason } if reason.contains("most-like")));

        let err = Answer::parse(9, Some(""), Some("D")).unwrap_err();
        assert!(matches!(err, Error::MalformedAnswer { question: 9, .. }));

        let answer = Answer::parse(10, Some("s"), Some("c")).unwrap();
        assert_eq!(answer.most_like(), Axis::S);
        assert_eq!(answer.least_like(), Axis::C);
    }
}
