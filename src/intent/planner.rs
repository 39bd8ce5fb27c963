//! Planner: applies density and redundancy filters over a sequence of
//! scored `CommentIntent`s to decide which ones the narrator actually
//! renders.

use std::collections::VecDeque;

use crate::constants::density_preset;
use crate::idea_tracker::RedundancyVerdict;
use crate::intent::{CommentIntent, Density};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerDecision {
    Include,
    BriefReference,
    Skip,
}

pub struct Planner {
    density: Density,
    window: VecDeque<bool>,
    consecutive: usize,
    total_plies: usize,
    included: usize,
}

impl Planner {
    pub fn new(density: Density) -> Self {
        Self {
            density,
            window: VecDeque::new(),
            consecutive: 0,
            total_plies: 0,
            included: 0,
        }
    }

    fn preset(&self) -> crate::constants::DensityPreset {
        density_preset(self.density)
    }

    /// Call once per ply, regardless of whether it produced an intent, to
    /// keep the density window's denominator correct.
    pub fn advance_ply(&mut self, included: bool) {
        self.total_plies += 1;
        self.window.push_back(included);
        let preset = self.preset();
        while self.window.len() > preset.window {
            self.window.pop_front();
        }
        if included {
            self.included += 1;
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }
    }

    fn window_count(&self) -> usize {
        self.window.iter().filter(|&&b| b).count()
    }

    fn ratio(&self) -> f64 {
        if self.total_plies == 0 {
            0.0
        } else {
            self.included as f64 / self.total_plies as f64
        }
    }

    /// Decides whether `intent` should be included, given the current
    /// idea-tracker redundancy verdict for it (if any).
    pub fn decide(&self, intent: &CommentIntent, redundancy: Option<RedundancyVerdict>) -> PlannerDecision {
        if let Some(verdict) = redundancy {
            match verdict {
                RedundancyVerdict::StrictlyRedundant => return PlannerDecision::Skip,
                RedundancyVerdict::StillFresh => return PlannerDecision::BriefReference,
                RedundancyVerdict::Fresh | RedundancyVerdict::WorthReexplaining => {}
            }
        }

        if intent.mandatory {
            return PlannerDecision::Include;
        }

        let preset = self.preset();
        if self.consecutive >= preset.max_consecutive {
            return PlannerDecision::Skip;
        }
        if self.window_count() >= preset.max_per_window {
            return PlannerDecision::Skip;
        }
        if self.ratio() >= preset.hard_ratio_cap {
            return PlannerDecision::Skip;
        }
        if intent.score <= 0.0 {
            return PlannerDecision::Skip;
        }

        PlannerDecision::Include
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentType;

    fn intent(score: f64, mandatory: bool) -> CommentIntent {
        CommentIntent {
            ply: 1,
            intent_type: IntentType::GeneralObservation,
            score,
            mandatory,
            idea_id: None,
            summary: "x".to_string(),
        }
    }

    #[test]
    fn mandatory_intents_always_included() {
        let planner = Planner::new(Density::Sparse);
        assert_eq!(planner.decide(&intent(-5.0, true), None), PlannerDecision::Include);
    }

    #[test]
    fn sparse_density_caps_consecutive_comments() {
        let mut planner = Planner::new(Density::Sparse);
        planner.advance_ply(true);
        let decision = planner.decide(&intent(0.5, false), None);
        assert_eq!(decision, PlannerDecision::Skip);
    }

    #[test]
    fn strict_redundancy_always_skips() {
        let planner = Planner::new(Density::Verbose);
        let decision = planner.decide(&intent(0.9, false), Some(RedundancyVerdict::StrictlyRedundant));
        assert_eq!(decision, PlannerDecision::Skip);
    }

    #[test]
    fn density_window_respects_ratio_cap() {
        let mut planner = Planner::new(Density::Sparse);
        for _ in 0..10 {
            planner.advance_ply(true);
        }
        let decision = planner.decide(&intent(0.9, false), None);
        assert_eq!(decision, PlannerDecision::Skip);
    }
}
