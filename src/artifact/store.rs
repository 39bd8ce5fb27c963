//! Position-keyed artifact store: one typed LRU+TTL bucket per artifact
//! kind, with monotone-replacement insert contracts and aggregate stats.

use std::time::Duration;

use crate::artifact::lru::{CacheStats, LruTtlCache};
use crate::artifact::{CandidateMove, DetectedTheme, EngineEval, Hce, MoveAssessment};
use crate::constants::*;
use crate::position::PositionKey;

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub engine_eval: CacheStats,
    pub themes: CacheStats,
    pub candidates: CacheStats,
    pub move_assessment: CacheStats,
    pub hce: CacheStats,
}

impl StoreStats {
    pub fn total_hits(&self) -> u64 {
        self.engine_eval.hits + self.themes.hits + self.candidates.hits + self.move_assessment.hits + self.hce.hits
    }

    pub fn total_misses(&self) -> u64 {
        self.engine_eval.misses
            + self.themes.misses
            + self.candidates.misses
            + self.move_assessment.misses
            + self.hce.misses
    }

    pub fn estimated_memory_bytes(&self) -> usize {
        // Coarse per-entry size estimate, good enough for operator visibility.
        const AVG_ENTRY_BYTES: usize = 512;
        AVG_ENTRY_BYTES
            * (self.engine_eval.hits as usize
                + self.themes.hits as usize
                + self.candidates.hits as usize
                + self.move_assessment.hits as usize
                + self.hce.hits as usize)
    }
}

pub struct ArtifactStore {
    engine_eval: LruTtlCache<(PositionKey, Tier), EngineEval>,
    themes: LruTtlCache<PositionKey, Vec<DetectedTheme>>,
    candidates: LruTtlCache<PositionKey, Vec<CandidateMove>>,
    move_assessment: LruTtlCache<(PositionKey, String), MoveAssessment>,
    hce: LruTtlCache<PositionKey, Hce>,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        let ttl = Duration::from_secs(LRU_TTL_SECS);
        Self {
            engine_eval: LruTtlCache::new(LRU_CAPACITY_ENGINE_EVAL, ttl),
            themes: LruTtlCache::new(LRU_CAPACITY_THEMES, ttl),
            candidates: LruTtlCache::new(LRU_CAPACITY_CANDIDATES, ttl),
            move_assessment: LruTtlCache::new(LRU_CAPACITY_MOVE_ASSESSMENT, ttl),
            hce: LruTtlCache::new(LRU_CAPACITY_HCE, ttl),
        }
    }
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_engine_eval_for_tier(&mut self, key: &PositionKey, tier: Tier) -> Option<&EngineEval> {
        self.engine_eval.get(&(key.clone(), tier))
    }

    /// Returns the best cached eval at `tier` or any higher tier.
    pub fn get_engine_eval(&mut self, key: &PositionKey, tier: Tier) -> Option<&EngineEval> {
        if Tier::Full >= tier {
            if let Some(eval) = self.engine_eval.get(&(key.clone(), Tier::Full)) {
                return Some(eval);
            }
        }
        if Tier::Standard >= tier {
            if let Some(eval) = self.engine_eval.get(&(key.clone(), Tier::Standard)) {
                return Some(eval);
            }
        }
        if Tier::Shallow >= tier {
            if let Some(eval) = self.engine_eval.get(&(key.clone(), Tier::Shallow)) {
                return Some(eval);
            }
        }
        None
    }

    /// Inserts an engine eval, replacing only if `depth` is >= the existing
    /// depth at that (key, tier) slot.
    pub fn put_engine_eval(&mut self, key: PositionKey, tier: Tier, eval: EngineEval) -> bool {
        self.engine_eval
            .insert_if_upgrade((key, tier), eval, |existing, candidate| candidate.depth >= existing.depth)
    }

    pub fn get_themes(&mut self, key: &PositionKey) -> Option<&Vec<DetectedTheme>> {
        self.themes.get(key)
    }

    pub fn put_themes(&mut self, key: PositionKey, themes: Vec<DetectedTheme>) -> bool {
        // More themes detected (i.e. a deeper tier ran) always upgrades.
        self.themes
            .insert_if_upgrade(key, themes, |existing, candidate| candidate.len() >= existing.len())
    }

    pub fn get_candidates(&mut self, key: &PositionKey) -> Option<&Vec<CandidateMove>> {
        self.candidates.get(key)
    }

    pub fn put_candidates(&mut self, key: PositionKey, candidates: Vec<CandidateMove>) -> bool {
        self.candidates
            .insert_if_upgrade(key, candidates, |existing, candidate| candidate.len() >= existing.len())
    }

    pub fn get_move_assessment(&mut self, key: &PositionKey, uci: &str) -> Option<&MoveAssessment> {
        self.move_assessment.get(&(key.clone(), uci.to_string()))
    }

    pub fn put_move_assessment(&mut self, key: PositionKey, uci: String, assessment: MoveAssessment) -> bool {
        self.move_assessment.insert_if_upgrade((key, uci), assessment, |_, _| true)
    }

    pub fn get_hce(&mut self, key: &PositionKey) -> Option<&Hce> {
        self.hce.get(key)
    }

    pub fn put_hce(&mut self, key: PositionKey, hce: Hce) -> bool {
        self.hce.insert_if_upgrade(key, hce, |_, _| true)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            engine_eval: self.engine_eval.stats(),
            themes: self.themes.stats(),
            candidates: self.candidates.stats(),
            move_assessment: self.move_assessment.stats(),
            hce: self.hce.stats(),
        }
    }

    pub fn clear_all(&mut self) {
        self.engine_eval.clear();
        self.themes.clear();
        self.candidates.clear();
        self.move_assessment.clear();
        self.hce.clear();
    }

    /// Sweeps all buckets for TTL-expired entries. Returns total evicted.
    pub fn prune(&mut self) -> usize {
        self.engine_eval.prune()
            + self.themes.prune()
            + self.candidates.prune()
            + self.move_assessment.prune()
            + self.hce.prune()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::PvLine;

    fn key(fen: &str) -> PositionKey {
        PositionKey::from_fen(fen).unwrap()
    }

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn cache_monotonicity_rejects_shallower_eval() {
        let mut store = ArtifactStore::new();
        let k = key(STARTPOS);
        let deep = EngineEval {
            lines: vec![PvLine {
                eval_cp: 20,
                moves_uci: vec!["e2e4".to_string()],
                depth: 18,
            }],
            depth: 18,
            multipv: 1,
        };
        let shallow = EngineEval {
            lines: vec![PvLine {
                eval_cp: 15,
                moves_uci: vec!["d2d4".to_string()],
                depth: 10,
            }],
            depth: 10,
            multipv: 1,
        };
        assert!(store.put_engine_eval(k.clone(), Tier::Standard, deep.clone()));
        assert!(!store.put_engine_eval(k.clone(), Tier::Standard, shallow));
        assert_eq!(store.get_engine_eval_for_tier(&k, Tier::Standard).unwrap().depth, 18);
    }

    #[test]
    fn tier_lookup_falls_back_to_higher_tier() {
        let mut store = ArtifactStore::new();
        let k = key(STARTPOS);
        let full_eval = EngineEval {
            lines: vec![PvLine {
                eval_cp: 30,
                moves_uci: vec![],
                depth: 22,
            }],
            depth: 22,
            multipv: 1,
        };
        store.put_engine_eval(k.clone(), Tier::Full, full_eval);
        assert!(store.get_engine_eval(&k, Tier::Shallow).is_some());
    }
}
