//! DISC scoring engine
//!
//! Pure functions from a set of forced-choice answers to a four-axis score.
//!
//! # Scoring Rules
//!
//! Per answer, every axis receives points:
//! - **Most like me:** +2
//! - **Least like me:** 0
//! - **Neither (the other two axes):** +1 each
//!
//! Each answer therefore distributes exactly 4 points, so the four totals of
//! a scored set always sum to `4 × answers`, i.e. 112 for a full 28-item test.
//! The engine verifies that identity on every computation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error};

use crate::disc::{Answer, Axis, QUESTION_COUNT};
use crate::{Error, Result};

/// Points for the axis chosen as "most like me"
pub const MOST_LIKE_POINTS: u32 = 2;
/// Points for the axis chosen as "least like me"
pub const LEAST_LIKE_POINTS: u32 = 0;
/// Points for each of the two axes chosen as neither
pub const UNSELECTED_POINTS: u32 = 1;
/// Points distributed by a single answer
pub const POINTS_PER_ANSWER: u32 = MOST_LIKE_POINTS + LEAST_LIKE_POINTS + 2 * UNSELECTED_POINTS;

/// Summed points per axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisScores {
    pub d: u32,
    pub i: u32,
    pub s: u32,
    pub c: u32,
}

impl AxisScores {
    pub fn new(d: u32, i: u32, s: u32, c: u32) -> Self {
        Self { d, i, s, c }
    }

    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::D => self.d,
            Axis::I => self.i,
            Axis::S => self.s,
            Axis::C => self.c,
        }
    }

    fn add(&mut self, axis: Axis, points: u32) {
        match axis {
            Axis::D => self.d += points,
            Axis::I => self.i += points,
            Axis::S => self.s += points,
            Axis::C => self.c += points,
        }
    }

    pub fn total(&self) -> u32 {
        self.d + self.i + self.s + self.c
    }

    /// Axis with the maximum score; ties resolve D > I > S > C
    pub fn primary_type(&self) -> Axis {
        let mut best = Axis::D;
        for axis in Axis::ALL {
            // strict comparison keeps the earlier axis on ties
            if self.get(axis) > self.get(best) {
                best = axis;
            }
        }
        best
    }

    /// Share of the total per axis, rounded to one decimal place
    pub fn percentages(&self) -> Percentages {
        let total = self.total();
        if total == 0 {
            return Percentages::default();
        }
        let pct = |value: u32| ((value as f64 / total as f64) * 100.0 * 10.0).round() / 10.0;
        Percentages {
            d: pct(self.d),
            i: pct(self.i),
            s: pct(self.s),
            c: pct(self.c),
        }
    }
}

/// Percentage view of an [`AxisScores`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentages {
    pub d: f64,
    pub i: f64,
    pub s: f64,
    pub c: f64,
}

impl Percentages {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::D => self.d,
            Axis::I => self.i,
            Axis::S => self.s,
            Axis::C => self.c,
        }
    }
}

/// Scored result of a complete questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scores: AxisScores,
    pub primary_type: Axis,
}

/// Points a single answer contributes to each axis
pub fn answer_points(answer: &Answer) -> AxisScores {
    let mut points = AxisScores::default();
    for axis in Axis::ALL {
        let awarded = if axis == answer.most_like() {
            MOST_LIKE_POINTS
        } else if axis == answer.least_like() {
            LEAST_LIKE_POINTS
        } else {
            UNSELECTED_POINTS
        };
        points.add(axis, awarded);
    }
    points
}

/// Sum the points of any number of answers, verifying point conservation
pub fn tally(answers: &[Answer]) -> Result<AxisScores> {
    let mut scores = AxisScores::default();
    for answer in answers {
        let points = answer_points(answer);
        for axis in Axis::ALL {
            scores.add(axis, points.get(axis));
        }
    }
    check_integrity(&scores, answers.len())?;
    Ok(scores)
}

/// Score a complete questionnaire: exactly one answer per question 1..=28
pub fn score(answers: &[Answer]) -> Result<ScoreCard> {
    check_complete(answers)?;

    let scores = tally(answers)?;
    let primary_type = scores.primary_type();

    debug!(
        d = scores.d,
        i = scores.i,
        s = scores.s,
        c = scores.c,
        primary_type = %primary_type,
        "Scored questionnaire"
    );

    Ok(ScoreCard {
        scores,
        primary_type,
    })
}

fn check_complete(answers: &[Answer]) -> Result<()> {
    if answers.len() != QUESTION_COUNT as usize {
        return Err(Error::IncompleteInput(format!(
            "expected {} answers, got {}",
            QUESTION_COUNT,
            answers.len()
        )));
    }

    let questions: BTreeSet<u32> = answers.iter().map(Answer::question).collect();
    if questions.len() != answers.len() {
        return Err(Error::IncompleteInput(format!(
            "duplicate question numbers: only {} distinct of {}",
            questions.len(),
            answers.len()
        )));
    }

    // 28 distinct values, each validated into 1..=28 by Answer::new
    Ok(())
}

fn check_integrity(scores: &AxisScores, answer_count: usize) -> Result<()> {
    let expected = POINTS_PER_ANSWER * answer_count as u32;
    let actual = scores.total();
    if actual != expected {
        error!(expected, actual, answer_count, "Score integrity check failed");
        return Err(Error::ScoreIntegrity { expected, actual });
    }
    Ok(())
}

/// How often each axis was picked as most-like and as least-like
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDistribution {
    pub most_like: AxisScores,
    pub least_like: AxisScores,
}

pub fn answer_distribution(answers: &[Answer]) -> AnswerDistribution {
    let mut distribution = AnswerDistribution::default();
    for answer in answers {
        distribution.most_like.add(answer.most_like(), 1);
        distribution.least_like.add(answer.least_like(), 1);
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(most: Axis, least: Axis) -> Vec<Answer> {
        (1..=QUESTION_COUNT)
            .map(|q| Answer::new(q, most, least).unwrap())
            .collect()
    }

    #[test]
    fn test_single_answer_points() {
        let answer = Answer::new(1, Axis::S, Axis::D).unwrap();
        let points = answer_points(&answer);
        assert_eq!(points, AxisScores::new(0, 1, 2, 1));
        assert_eq!(points.total(), POINTS_PER_ANSWER);
    }

    #[test]
    fn test_least_like_scores_zero_and_unselected_scores_one() {
        // Pin the policy: least-like is 0 (not -1), unselected is 1 (not 0)
        let answer = Answer::new(1, Axis::C, Axis::I).unwrap();
        let points = answer_points(&answer);
        assert_eq!(points.get(Axis::I), 0);
        assert_eq!(points.get(Axis::D), 1);
        assert_eq!(points.get(Axis::S), 1);
        assert_eq!(points.get(Axis::C), 2);
    }

    #[test]
    fn test_every_valid_pair_awards_four_points() {
        let mut pairs = 0;
        for most in Axis::ALL {
            for least in Axis::ALL.into_iter().filter(|&a| a != most) {
                let points = answer_points(&Answer::new(1, most, least).unwrap());
                assert_eq!(points.total(), POINTS_PER_ANSWER, "{} over {}", most, least);
                assert_eq!(points.get(most), MOST_LIKE_POINTS);
                assert_eq!(points.get(least), LEAST_LIKE_POINTS);
                pairs += 1;
            }
        }
        assert_eq!(pairs, 12);
    }

    #[test]
    fn test_random_batches_conserve_points() {
        use rand::seq::SliceRandom;
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut answers: Vec<Answer> = (1..=QUESTION_COUNT)
                .map(|q| {
                    let most = rng.gen_range(0..4);
                    let least = (most + rng.gen_range(1..4)) % 4;
                    Answer::new(q, Axis::ALL[most], Axis::ALL[least]).unwrap()
                })
                .collect();

            let card = score(&answers).unwrap();
            assert_eq!(card.scores.total(), 112);

            answers.shuffle(&mut rng);
            assert_eq!(score(&answers).unwrap(), card);
        }
    }

    #[test]
    fn test_all_d_over_i() {
        let card = score(&uniform(Axis::D, Axis::I)).unwrap();
        assert_eq!(card.scores, AxisScores::new(56, 0, 28, 28));
        assert_eq!(card.scores.total(), 112);
        assert_eq!(card.primary_type, Axis::D);
    }

    #[test]
    fn test_four_way_tie_resolves_to_d() {
        let cycle = [
            (Axis::D, Axis::I),
            (Axis::I, Axis::D),
            (Axis::S, Axis::C),
            (Axis::C, Axis::S),
        ];
        let answers: Vec<Answer> = (1..=QUESTION_COUNT)
            .map(|q| {
                let (most, least) = cycle[(q as usize - 1) % cycle.len()];
                Answer::new(q, most, least).unwrap()
            })
            .collect();

        let card = score(&answers).unwrap();
        assert_eq!(card.scores, AxisScores::new(28, 28, 28, 28));
        assert_eq!(card.primary_type, Axis::D);
    }

    #[test]
    fn test_partial_ties_follow_priority() {
        assert_eq!(AxisScores::new(10, 30, 30, 10).primary_type(), Axis::I);
        assert_eq!(AxisScores::new(10, 20, 30, 30).primary_type(), Axis::S);
        assert_eq!(AxisScores::new(10, 20, 30, 31).primary_type(), Axis::C);
        assert_eq!(AxisScores::default().primary_type(), Axis::D);
    }

    #[test]
    fn test_order_does_not_change_result() {
        let mut answers: Vec<Answer> = (1..=QUESTION_COUNT)
            .map(|q| {
                let most = Axis::ALL[(q as usize * 3) % 4];
                let least = Axis::ALL[(q as usize * 3 + 1 + q as usize % 3) % 4];
                Answer::new(q, most, least).unwrap()
            })
            .collect();

        let forward = score(&answers).unwrap();
        answers.reverse();
        let backward = score(&answers).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.scores.total(), 112);
    }

    #[test]
    fn test_rejects_wrong_count() {
        let mut answers = uniform(Axis::D, Axis::I);
        answers.remove(13);
        assert!(matches!(score(&answers), Err(Error::IncompleteInput(_))));

        assert!(matches!(score(&[]), Err(Error::IncompleteInput(_))));
    }

    #[test]
    fn test_rejects_duplicate_questions() {
        let mut answers = uniform(Axis::D, Axis::I);
        answers[27] = Answer::new(1, Axis::S, Axis::C).unwrap();
        assert!(matches!(score(&answers), Err(Error::IncompleteInput(_))));
    }

    #[test]
    fn test_integrity_check_flags_corrupted_total() {
        let corrupted = AxisScores::new(56, 0, 28, 27);
        let err = check_integrity(&corrupted, 28).unwrap_err();
        assert!(matches!(err, Error::ScoreIntegrity { expected: 112, actual: 111 }));
    }

    #[test]
    fn test_tally_holds_identity_for_partial_sets() {
        let answers = &uniform(Axis::C, Axis::S)[..10];
        let scores = tally(answers).unwrap();
        assert_eq!(scores.total(), 40);
        assert_eq!(scores, AxisScores::new(10, 10, 0, 20));
    }

    #[test]
    fn test_percentages() {
        let pct = AxisScores::new(56, 0, 28, 28).percentages();
        assert_eq!(pct, Percentages { d: 50.0, i: 0.0, s: 25.0, c: 25.0 });

        // 37/112 = 33.035..% -> 33.0, 30/112 = 26.785..% -> 26.8
        let pct = AxisScores::new(37, 30, 25, 20).percentages();
        assert_eq!(pct.d, 33.0);
        assert_eq!(pct.i, 26.8);
        assert_eq!(pct.s, 22.3);
        assert_eq!(pct.c, 17.9);
    }

    #[test]
    fn test_percentages_of_empty_total_are_zero() {
        assert_eq!(AxisScores::default().percentages(), Percentages::default());
    }

    #[test]
    fn test_answer_distribution() {
        let mut answers = uniform(Axis::D, Axis::I);
        answers[0] = Answer::new(1, Axis::S, Axis::C).unwrap();
        let dist = answer_distribution(&answers);
        assert_eq!(dist.most_like, AxisScores::new(27, 0, 1, 0));
        assert_eq!(dist.least_like, AxisScores::new(0, 27, 0, 1));
    }
}
