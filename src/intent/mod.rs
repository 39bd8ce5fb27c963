//! Intent generation: turns analysis artifacts for a ply into scored
//! `CommentIntent`s, which the planner then filters by density and
//! redundancy before handing them to the narrator.

pub mod planner;

use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Density {
    Sparse,
    Normal,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentType {
    MoveQuality,
    TacticalTheme,
    PositionalTheme,
    Weakness,
    PlanShift,
    CriticalMoment,
    AlternativeLine,
    OpeningTheory,
    EndgameTechnique,
    GeneralObservation,
}

#[derive(Debug, Clone)]
pub struct IntentInput {
    pub ply: u32,
    pub criticality: f64,
    pub theme_novelty: f64,
    pub instructional_value: f64,
    pub cp_swing: i32,
    pub is_significant_theme: bool,
    pub intent_type: IntentType,
    pub idea_id: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct CommentIntent {
    pub ply: u32,
    pub intent_type: IntentType,
    pub score: f64,
    pub mandatory: bool,
    pub idea_id: Option<String>,
    pub summary: String,
}

/// Scores an intent input per the weighted formula:
/// `score = w_crit*criticality + w_novelty*theme_novelty
///   + w_instructional*instructional_value - w_redundancy*redundancy_penalty`
pub fn score_intent(input: &IntentInput, redundancy_penalty: f64) -> CommentIntent {
    let score = INTENT_WEIGHT_CRITICALITY * (input.criticality / 100.0)
        + INTENT_WEIGHT_THEME_NOVELTY * input.theme_novelty
        + INTENT_WEIGHT_INSTRUCTIONAL_VALUE * input.instructional_value
        - INTENT_WEIGHT_REDUNDANCY_PENALTY * redundancy_penalty;

    let mandatory = input.cp_swing.unsigned_abs() as i32 >= MANDATORY_INTENT_CP_SWING || input.is_significant_theme;

    CommentIntent {
        ply: input.ply,
        intent_type: input.intent_type,
        score,
        mandatory,
        idea_id: input.idea_id.clone(),
        summary: input.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_cp_swing_is_mandatory() {
        let intent = score_intent(
            &IntentInput {
                ply: 10,
                criticality: 50.0,
                theme_novelty: 0.0,
                instructional_value: 0.0,
                cp_swing: 200,
                is_significant_theme: false,
                intent_type: IntentType::MoveQuality,
                idea_id: None,
                summary: "blunder".to_string(),
            },
            0.0,
        );
        assert!(intent.mandatory);
    }

    #[test]
    fn small_quiet_swing_is_not_mandatory() {
        let intent = score_intent(
            &IntentInput {
                ply: 10,
                criticality: 10.0,
                theme_novelty: 0.0,
                instructional_value: 0.0,
                cp_swing: 20,
                is_significant_theme: false,
                intent_type: IntentType::GeneralObservation,
                idea_id: None,
                summary: "quiet move".to_string(),
            },
            0.0,
        );
        assert!(!intent.mandatory);
    }
}
