//! Primary-type descriptions shown alongside a result

use serde::Serialize;

use crate::disc::Axis;

/// Presentation text for one primary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeDescription {
    pub axis: Axis,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub summary: &'static str,
    pub strengths: &'static [&'static str],
    pub development_areas: &'static [&'static str],
}

const DOMINANCE: TypeDescription = TypeDescription {
    axis: Axis::D,
    name: "Dominance",
    subtitle: "The challenging leader",
    summary: "Results-oriented and decisive. Moves quickly, takes risks to reach a goal \
              and is comfortable directing others.",
    strengths: &["Drive and leadership", "Fast decisions", "Composure under pressure"],
    development_areas: &["Listening before deciding", "Attention to detail", "Patience"],
};

const INFLUENCE: TypeDescription = TypeDescription {
    axis: Axis::I,
    name: "Influence",
    subtitle: "The inspiring communicator",
    summary: "Sociable and optimistic. Builds relationships easily and motivates people \
              through enthusiasm.",
    strengths: &["Persuasion", "Team energy", "Networking"],
    development_areas: &["Follow-through", "Time management", "Objective analysis"],
};

const STEADINESS: TypeDescription = TypeDescription {
    axis: Axis::S,
    name: "Steadiness",
    subtitle: "The dependable supporter",
    summary: "Calm, patient and loyal. Values harmony and consistency and works steadily \
              toward shared goals.",
    strengths: &["Reliability", "Cooperation", "Active listening"],
    development_areas: &["Adapting to change", "Asserting opinions", "Saying no"],
};

const CONSCIENTIOUSNESS: TypeDescription = TypeDescription {
    axis: Axis::C,
    name: "Conscientiousness",
    subtitle: "The careful analyst",
    summary: "Precise and systematic. Relies on data, sets high quality standards and \
              plans before acting.",
    strengths: &["Accuracy", "Analytical thinking", "Planning"],
    development_areas: &["Accepting imperfection", "Speed of decision", "Flexibility"],
};

/// Description for a primary type
pub fn describe(axis: Axis) -> &'static TypeDescription {
    match axis {
        Axis::D => &DOMINANCE,
        Axis::I => &INFLUENCE,
        Axis::S => &STEADINESS,
        Axis::C => &CONSCIENTIOUSNESS,
    }
}
