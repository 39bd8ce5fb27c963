//! Best-first exploration engine: a max-heap over exploration priority,
//! tier promotion, and exhaustive stopping reasons.
//!
//! Grounded on the teacher's `game/search.rs` `PvsSearcher` (best-first
//! iterative loop with atomic cancellation) and `src/worker/mod.rs`'s
//! stop-flag convention; `std::collections::BinaryHeap` plays the role the
//! teacher's move-ordering buffer plays in `search.rs`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::constants::*;
use crate::position::PositionKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    QueueExhausted,
    NodeBudgetExhausted,
    TimeBudgetExhausted,
    DepthLimitReached,
    NoWorthyCandidates,
    Cancelled,
    DiminishingReturns,
}

#[derive(Debug, Clone)]
pub struct ExplorationCandidate {
    pub position_key: PositionKey,
    pub uci: String,
    pub depth: u32,
    pub criticality: f64,
    pub info_gain: f64,
    pub novelty: f64,
    pub cost: f64,
}

fn priority(c: &ExplorationCandidate) -> f64 {
    let base = PRIORITY_WEIGHT_CRITICALITY * c.criticality / 100.0 + PRIORITY_WEIGHT_INFO_GAIN * c.info_gain
        + PRIORITY_WEIGHT_NOVELTY * c.novelty
        - PRIORITY_WEIGHT_COST * c.cost;
    base * (1.0 - (c.depth as f64 / 100.0)).max(0.0) * 100.0
}

struct HeapItem {
    candidate: ExplorationCandidate,
    priority: f64,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.partial_cmp(&other.priority).unwrap_or(Ordering::Equal)
    }
}

pub struct ExplorationBudget {
    pub max_nodes: usize,
    pub max_depth: u32,
    pub time_budget: Duration,
}

pub struct ExplorationEngine {
    heap: BinaryHeap<HeapItem>,
    explored: HashSet<PositionKey>,
    budget: ExplorationBudget,
    stop_flag: Arc<AtomicBool>,
}

pub struct ExplorationOutcome {
    pub explored_order: Vec<ExplorationCandidate>,
    pub stop_reason: StopReason,
}

impl ExplorationEngine {
    pub fn new(budget: ExplorationBudget, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            explored: HashSet::new(),
            budget,
            stop_flag,
        }
    }

    fn push(&mut self, candidate: ExplorationCandidate) {
        let p = priority(&candidate);
        self.heap.push(HeapItem { candidate, priority: p });
    }

    /// Runs the exploration loop from `root_fen` seeded with
    /// `initial_candidates`. Each popped candidate may, via `expand`, yield
    /// further candidates (e.g. the reached position's own best replies) to
    /// push back onto the heap.
    pub fn explore(
        &mut self,
        initial_candidates: Vec<ExplorationCandidate>,
        mut expand: impl FnMut(&ExplorationCandidate) -> Vec<ExplorationCandidate>,
    ) -> ExplorationOutcome {
        for c in initial_candidates {
            self.push(c);
        }

        let start = Instant::now();
        let mut explored_order = Vec::new();
        let mut consecutive_low_value = 0u32;

        let stop_reason = loop {
            if self.stop_flag.load(AtomicOrdering::Relaxed) {
                break StopReason::Cancelled;
            }
            if start.elapsed() >= self.budget.time_budget {
                break StopReason::TimeBudgetExhausted;
            }
            if explored_order.len() >= self.budget.max_nodes {
                break StopReason::NodeBudgetExhausted;
            }

            let Some(item) = self.heap.pop() else {
                break StopReason::QueueExhausted;
            };
            let candidate = item.candidate;

            if candidate.depth > self.budget.max_depth {
                break StopReason::DepthLimitReached;
            }
            if self.explored.contains(&candidate.position_key) {
                continue;
            }
            if item.priority <= 0.0 {
                consecutive_low_value += 1;
                if consecutive_low_value >= 5 {
                    break StopReason::DiminishingReturns;
                }
                continue;
            }
            consecutive_low_value = 0;

            self.explored.insert(candidate.position_key.clone());
            let children = expand(&candidate);
            explored_order.push(candidate);
            for child in children {
                self.push(child);
            }

            if self.heap.is_empty() && explored_order.is_empty() {
                break StopReason::NoWorthyCandidates;
            }
        };

        ExplorationOutcome {
            explored_order,
            stop_reason,
        }
    }

    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u64) -> PositionKey {
        // Position keys are content-addressed in production; tests fake
        // distinct keys via distinct starting FENs' move counters.
        PositionKey::from_fen(&format!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 {}",
            n + 1
        ))
        .unwrap()
    }

    #[test]
    fn exploration_terminates_when_queue_empties() {
        let mut engine = ExplorationEngine::new(
            ExplorationBudget {
                max_nodes: 100,
                max_depth: 50,
                time_budget: Duration::from_secs(5),
            },
            Arc::new(AtomicBool::new(false)),
        );
        let initial = vec![ExplorationCandidate {
            position_key: key(1),
            uci: "e2e4".to_string(),
            depth: 1,
            criticality: 50.0,
            info_gain: 1.0,
            novelty: 1.0,
            cost: 0.1,
        }];
        let outcome = engine.explore(initial, |_| vec![]);
        assert_eq!(outcome.stop_reason, StopReason::QueueExhausted);
        assert_eq!(outcome.explored_order.len(), 1);
    }

    #[test]
    fn heap_invariant_pops_highest_priority_first() {
        let mut engine = ExplorationEngine::new(
            ExplorationBudget {
                max_nodes: 100,
                max_depth: 50,
                time_budget: Duration::from_secs(5),
            },
            Arc::new(AtomicBool::new(false)),
        );
        let low = ExplorationCandidate {
            position_key: key(1),
            uci: "a2a3".to_string(),
            depth: 1,
            criticality: 5.0,
            info_gain: 0.1,
            novelty: 0.1,
            cost: 0.1,
        };
        let high = ExplorationCandidate {
            position_key: key(2),
            uci: "e2e4".to_string(),
            depth: 1,
            criticality: 90.0,
            info_gain: 2.0,
            novelty: 2.0,
            cost: 0.1,
        };
        let mut order = Vec::new();
        let outcome = {
            engine.explore(vec![low, high], |c| {
                order.push(c.uci.clone());
                vec![]
            })
        };
        assert_eq!(outcome.explored_order[0].uci, "e2e4");
    }

    #[test]
    fn cancellation_stops_immediately() {
        let stop_flag = Arc::new(AtomicBool::new(true));
        let mut engine = ExplorationEngine::new(
            ExplorationBudget {
                max_nodes: 100,
                max_depth: 50,
                time_budget: Duration::from_secs(5),
            },
            stop_flag,
        );
        let initial = vec![ExplorationCandidate {
            position_key: key(1),
            uci: "e2e4".to_string(),
            depth: 1,
            criticality: 50.0,
            info_gain: 1.0,
            novelty: 1.0,
            cost: 0.1,
        }];
        let outcome = engine.explore(initial, |_| vec![]);
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert!(outcome.explored_order.is_empty());
    }
}
