//! Move classifier: maps a centipawn delta (and a few contextual flags) to
//! `{brilliant, excellent, good, inaccuracy, mistake, blunder, forced,
//! book}` plus the fixed NAG table.
//!
//! No direct teacher analogue; cp-delta convention (positive = good for the
//! side to move, mate encoded as large magnitude) follows the teacher's
//! `game/search.rs`.

use crate::artifact::{Classification, Severity};
use crate::constants::*;

pub struct ClassifyInput {
    /// Evaluation (cp, side-to-move-before perspective) before the move.
    pub eval_before: i32,
    /// Evaluation (cp, side-to-move-before perspective) after the move.
    pub eval_after: i32,
    pub is_forced: bool,
    pub is_book: bool,
    /// True if the move was the single best engine line yet sacrifices
    /// material for a non-obvious, deep advantage (spec's "brilliant" gate).
    pub is_only_good_move_and_sacrifices: bool,
}

pub struct ClassifyOutput {
    pub classification: Classification,
    pub nags: Vec<u8>,
    pub cp_delta: i32,
    pub cp_loss: i32,
    pub severity: Severity,
}

/// `cp_delta = eval_before - eval_after`, i.e. how much the position's
/// evaluation (both sides expressed in the mover's fixed perspective)
/// dropped after their move. Positive means the move lost ground.
pub fn cp_delta(eval_before: i32, eval_after: i32) -> i32 {
    eval_before - eval_after
}

/// Blunder -> critical; mistake or cp_loss >= 150 -> significant;
/// inaccuracy or cp_loss >= 50 -> minor; else neutral.
fn severity(classification: &Classification, cp_loss: i32) -> Severity {
    match classification {
        Classification::Blunder => Severity::Critical,
        Classification::Mistake => Severity::Significant,
        _ if cp_loss >= 150 => Severity::Significant,
        Classification::Inaccuracy => Severity::Minor,
        _ if cp_loss >= 50 => Severity::Minor,
        _ => Severity::Neutral,
    }
}

pub fn classify(input: &ClassifyInput) -> ClassifyOutput {
    if input.is_book {
        return ClassifyOutput {
            classification: Classification::Book,
            nags: vec![],
            cp_delta: 0,
            cp_loss: 0,
            severity: Severity::Neutral,
        };
    }
    if input.is_forced {
        return ClassifyOutput {
            classification: Classification::Forced,
            nags: vec![NAG_FORCED_MOVE],
            cp_delta: 0,
            cp_loss: 0,
            severity: Severity::Neutral,
        };
    }

    let delta = cp_delta(input.eval_before, input.eval_after);
    let loss = delta.max(0);

    let (classification, nags) = if input.is_only_good_move_and_sacrifices && delta <= 0 {
        (Classification::Brilliant, vec![NAG_BRILLIANT_MOVE])
    } else if delta <= 10 {
        (Classification::Excellent, vec![NAG_GOOD_MOVE])
    } else if delta <= 30 {
        (Classification::Good, vec![])
    } else if delta <= 90 {
        (Classification::Inaccuracy, vec![NAG_INACCURACY])
    } else if delta <= 200 {
        (Classification::Mistake, vec![NAG_MISTAKE])
    } else {
        (Classification::Blunder, vec![NAG_BLUNDER])
    };

    let severity = severity(&classification, loss);

    ClassifyOutput {
        classification,
        nags,
        cp_delta: delta,
        cp_loss: loss,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp_delta_matches_formula() {
        assert_eq!(cp_delta(120, -160), 280);
        assert_eq!(cp_delta(0, -280), 280);
    }

    #[test]
    fn large_delta_classifies_as_blunder_with_correct_nag_and_severity() {
        let out = classify(&ClassifyInput {
            eval_before: 0,
            eval_after: -280,
            is_forced: false,
            is_book: false,
            is_only_good_move_and_sacrifices: false,
        });
        assert_eq!(out.cp_delta, 280);
        assert_eq!(out.classification, Classification::Blunder);
        assert_eq!(out.nags, vec![NAG_BLUNDER]);
        assert_eq!(out.severity, Severity::Critical);
    }

    #[test]
    fn mid_delta_classifies_as_mistake_with_significant_severity() {
        let out = classify(&ClassifyInput {
            eval_before: 0,
            eval_after: -150,
            is_forced: false,
            is_book: false,
            is_only_good_move_and_sacrifices: false,
        });
        assert_eq!(out.cp_delta, 150);
        assert_eq!(out.classification, Classification::Mistake);
        assert_eq!(out.nags, vec![NAG_MISTAKE]);
        assert_eq!(out.severity, Severity::Significant);
    }

    #[test]
    fn book_and_forced_moves_short_circuit() {
        let out = classify(&ClassifyInput {
            eval_before: 0,
            eval_after: -500,
            is_forced: false,
            is_book: true,
            is_only_good_move_and_sacrifices: false,
        });
        assert_eq!(out.classification, Classification::Book);

        let out = classify(&ClassifyInput {
            eval_before: 0,
            eval_after: -500,
            is_forced: true,
            is_book: false,
            is_only_good_move_and_sacrifices: false,
        });
        assert_eq!(out.classification, Classification::Forced);
        assert_eq!(out.nags, vec![NAG_FORCED_MOVE]);
    }

    #[test]
    fn small_delta_is_excellent() {
        let out = classify(&ClassifyInput {
            eval_before: 20,
            eval_after: 15,
            is_forced: false,
            is_book: false,
            is_only_good_move_and_sacrifices: false,
        });
        assert_eq!(out.cp_delta, 5);
        assert_eq!(out.classification, Classification::Excellent);
        assert_eq!(out.nags, vec![NAG_GOOD_MOVE]);
        assert_eq!(out.severity, Severity::Neutral);
    }
}
