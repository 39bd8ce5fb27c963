//! Line memory: a rolling natural-language-ready summary (bounded to 15
//! entries, pruned by priority), an eval trend (bounded to 100 points), and
//! theme-delta tracking across plies of one line.
//!
//! Grounded structurally on the teacher's `mcts_cache.rs` bounded history
//! buffers; the priority/decay semantics are new (spec-only domain).

use std::collections::VecDeque;

use crate::artifact::DetectedTheme;
use crate::constants::*;

#[derive(Debug, Clone)]
pub struct SummaryEntry {
    pub ply: u32,
    pub text: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeDeltaKind {
    Emerged,
    Escalated,
    Persisting,
    Resolved,
    Weakened,
}

#[derive(Debug, Clone)]
pub struct ThemeDelta {
    pub theme_id: String,
    pub kind: ThemeDeltaKind,
}

#[derive(Debug, Clone, Default)]
pub struct LineMemory {
    rolling_summary: VecDeque<SummaryEntry>,
    eval_trend: VecDeque<i32>,
    previous_themes: Vec<DetectedTheme>,
}

impl LineMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rolling_summary(&self) -> &VecDeque<SummaryEntry> {
        &self.rolling_summary
    }

    pub fn eval_trend(&self) -> &VecDeque<i32> {
        &self.eval_trend
    }

    pub fn push_eval(&mut self, eval_cp: i32) {
        self.eval_trend.push_back(eval_cp);
        while self.eval_trend.len() > LINE_MEMORY_MAX_EVAL_TREND {
            self.eval_trend.pop_front();
        }
    }

    pub fn push_summary(&mut self, ply: u32, text: String, priority: u8) {
        self.rolling_summary.push_back(SummaryEntry { ply, text, priority });
        if self.rolling_summary.len() > LINE_MEMORY_MAX_ROLLING_SUMMARY {
            self.evict_lowest_priority();
        }
    }

    fn evict_lowest_priority(&mut self) {
        if let Some((idx, _)) = self
            .rolling_summary
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.priority, std::cmp::Reverse(e.ply)))
        {
            self.rolling_summary.remove(idx);
        }
    }

    pub fn eval_swing(&self, window: usize) -> Option<i32> {
        if self.eval_trend.len() < 2 {
            return None;
        }
        let n = self.eval_trend.len();
        let start = n.saturating_sub(window).max(0);
        let first = self.eval_trend.get(start)?;
        let last = self.eval_trend.back()?;
        Some(last - first)
    }

    /// Compares `current_themes` against the previously recorded theme set
    /// for this line, producing deltas, and updates the stored baseline.
    pub fn diff_themes(&mut self, current_themes: &[DetectedTheme]) -> Vec<ThemeDelta> {
        let mut deltas = Vec::new();
        for theme in current_themes {
            let prior = self.previous_themes.iter().find(|t| t.id == theme.id && t.beneficiary == theme.beneficiary);
            match prior {
                None => deltas.push(ThemeDelta {
                    theme_id: theme.id.clone(),
                    kind: ThemeDeltaKind::Emerged,
                }),
                Some(prior) if theme.severity > prior.severity => deltas.push(ThemeDelta {
                    theme_id: theme.id.clone(),
                    kind: ThemeDeltaKind::Escalated,
                }),
                Some(prior) if theme.severity < prior.severity => deltas.push(ThemeDelta {
                    theme_id: theme.id.clone(),
                    kind: ThemeDeltaKind::Weakened,
                }),
                Some(_) => deltas.push(ThemeDelta {
                    theme_id: theme.id.clone(),
                    kind: ThemeDeltaKind::Persisting,
                }),
            }
        }
        for prior in &self.previous_themes {
            if !current_themes.iter().any(|t| t.id == prior.id && t.beneficiary == prior.beneficiary) {
                deltas.push(ThemeDelta {
                    theme_id: prior.id.clone(),
                    kind: ThemeDeltaKind::Resolved,
                });
            }
        }
        self.previous_themes = current_themes.to_vec();
        deltas
    }

    /// Clones the memory state for branching at a DAG fork point.
    pub fn fork(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ThemeCategory;
    use shakmaty::Color;

    #[test]
    fn rolling_summary_is_bounded_and_keeps_high_priority() {
        let mut mem = LineMemory::new();
        for i in 0..20 {
            mem.push_summary(i, format!("ply {i}"), if i == 5 { SUMMARY_PRIORITY_EVAL_SWING } else { SUMMARY_PRIORITY_OTHER });
        }
        assert!(mem.rolling_summary().len() <= LINE_MEMORY_MAX_ROLLING_SUMMARY);
        assert!(mem.rolling_summary().iter().any(|e| e.ply == 5));
    }

    #[test]
    fn eval_trend_is_bounded() {
        let mut mem = LineMemory::new();
        for i in 0..150 {
            mem.push_eval(i);
        }
        assert_eq!(mem.eval_trend().len(), LINE_MEMORY_MAX_EVAL_TREND);
    }

    #[test]
    fn theme_diff_detects_emergence_and_resolution() {
        let mut mem = LineMemory::new();
        let t1 = DetectedTheme {
            id: "pin".to_string(),
            category: ThemeCategory::Tactical,
            beneficiary: Color::White,
            squares: vec![],
            description: String::new(),
            severity: 5,
        };
        let deltas = mem.diff_themes(&[t1.clone()]);
        assert_eq!(deltas[0].kind, ThemeDeltaKind::Emerged);

        let deltas = mem.diff_themes(&[]);
        assert_eq!(deltas[0].kind, ThemeDeltaKind::Resolved);
    }
}
