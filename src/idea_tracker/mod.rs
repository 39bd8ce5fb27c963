//! Idea tracker: remembers which strategic/tactical ideas have already been
//! explained, with game-scoped relevance decay and line-scoped strict
//! redundancy.

use std::collections::HashMap;

use crate::constants::*;

#[derive(Debug, Clone)]
pub struct TrackedIdea {
    pub id: String,
    pub description: String,
    pub relevance: f64,
    pub last_mentioned_ply: u32,
    pub times_explained: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedundancyVerdict {
    /// Never mentioned before in this line; always include.
    Fresh,
    /// Already mentioned in this exact line; suppress.
    StrictlyRedundant,
    /// Mentioned earlier in the game but decayed enough to be worth a
    /// refresher.
    WorthReexplaining,
    /// Mentioned recently enough in the game that it should be skipped.
    StillFresh,
}

#[derive(Debug, Clone, Default)]
pub struct IdeaTracker {
    /// Keyed by idea id; scope is the whole game.
    game_scope: HashMap<String, TrackedIdea>,
}

impl IdeaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_line(&self) -> HashMap<String, TrackedIdea> {
        // Lines fork from game-scope state but track their own mentions.
        HashMap::new()
    }

    fn decayed_relevance(idea: &TrackedIdea, current_ply: u32) -> f64 {
        let elapsed = current_ply.saturating_sub(idea.last_mentioned_ply) as i32;
        idea.relevance * (1.0 - IDEA_DECAY_RATE).powi(elapsed)
    }

    pub fn check_redundancy(&self, line_scope: &HashMap<String, TrackedIdea>, idea_id: &str, current_ply: u32) -> RedundancyVerdict {
        if line_scope.contains_key(idea_id) {
            return RedundancyVerdict::StrictlyRedundant;
        }
        match self.game_scope.get(idea_id) {
            None => RedundancyVerdict::Fresh,
            Some(idea) => {
                let decayed = Self::decayed_relevance(idea, current_ply);
                if decayed < IDEA_MIN_RELEVANCE || current_ply.saturating_sub(idea.last_mentioned_ply) >= IDEA_REEXPLAIN_THRESHOLD {
                    RedundancyVerdict::WorthReexplaining
                } else {
                    RedundancyVerdict::StillFresh
                }
            }
        }
    }

    pub fn mark_explained(&mut self, line_scope: &mut HashMap<String, TrackedIdea>, idea_id: &str, description: &str, ply: u32) {
        let entry = self.game_scope.entry(idea_id.to_string()).or_insert_with(|| TrackedIdea {
            id: idea_id.to_string(),
            description: description.to_string(),
            relevance: 1.0,
            last_mentioned_ply: ply,
            times_explained: 0,
        });
        entry.relevance = 1.0;
        entry.last_mentioned_ply = ply;
        entry.times_explained += 1;

        line_scope.insert(
            idea_id.to_string(),
            TrackedIdea {
                id: idea_id.to_string(),
                description: description.to_string(),
                relevance: 1.0,
                last_mentioned_ply: ply,
                times_explained: 1,
            },
        );

        if self.game_scope.len() > IDEA_MAX_PER_SCOPE {
            self.prune_least_relevant(ply);
        }
    }

    fn prune_least_relevant(&mut self, current_ply: u32) {
        if let Some(worst_id) = self
            .game_scope
            .iter()
            .min_by(|(_, a), (_, b)| {
                Self::decayed_relevance(a, current_ply)
                    .partial_cmp(&Self::decayed_relevance(b, current_ply))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(id, _)| id.clone())
        {
            self.game_scope.remove(&worst_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_redundancy_within_a_line() {
        let mut tracker = IdeaTracker::new();
        let mut line = tracker.start_line();
        tracker.mark_explained(&mut line, "weak_king", "open king", 10);
        assert_eq!(
            tracker.check_redundancy(&line, "weak_king", 11),
            RedundancyVerdict::StrictlyRedundant
        );
    }

    #[test]
    fn game_scope_decay_allows_reexplaining_after_threshold() {
        let mut tracker = IdeaTracker::new();
        let mut line1 = tracker.start_line();
        tracker.mark_explained(&mut line1, "weak_king", "open king", 1);

        let line2 = tracker.start_line();
        let verdict = tracker.check_redundancy(&line2, "weak_king", 1 + IDEA_REEXPLAIN_THRESHOLD);
        assert_eq!(verdict, RedundancyVerdict::WorthReexplaining);

        let verdict_soon = tracker.check_redundancy(&line2, "weak_king", 2);
        assert_eq!(verdict_soon, RedundancyVerdict::StillFresh);
    }

    #[test]
    fn fresh_idea_is_never_redundant() {
        let tracker = IdeaTracker::new();
        let line = tracker.start_line();
        assert_eq!(tracker.check_redundancy(&line, "never_seen", 5), RedundancyVerdict::Fresh);
    }

    #[test]
    fn pruning_keeps_scope_bounded() {
        let mut tracker = IdeaTracker::new();
        let mut line = tracker.start_line();
        for i in 0..(IDEA_MAX_PER_SCOPE + 10) {
            tracker.mark_explained(&mut line, &format!("idea_{i}"), "x", i as u32);
        }
        assert!(tracker.game_scope.len() <= IDEA_MAX_PER_SCOPE);
    }
}
