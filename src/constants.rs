//! Shared tuning constants: piece values, NAG table, tier defaults, and the
//! scoring weights used by the classifier, criticality scorer, exploration
//! engine, idea tracker, and intent planner.

use crate::intent::Density;

// --- Piece values (centipawns) ---
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

// --- Game phase (tapered eval) ---
pub const QUEEN_PHASE_VAL: i32 = 4;
pub const ROOK_PHASE_VAL: i32 = 2;
pub const BISHOP_PHASE_VAL: i32 = 1;
pub const KNIGHT_PHASE_VAL: i32 = 1;
pub const TOTAL_PHASE: i32 =
    (QUEEN_PHASE_VAL * 2) + (ROOK_PHASE_VAL * 4) + (BISHOP_PHASE_VAL * 4) + (KNIGHT_PHASE_VAL * 4);

// --- Theme/HCE factor bonuses, carried from the teacher's evaluation module ---
pub const DOUBLED_PAWN_PENALTY: i32 = 10;
pub const ISOLATED_PAWN_PENALTY: i32 = 20;
pub const BACKWARD_PAWN_PENALTY: i32 = 5;
pub const PASSED_PAWN_RANK_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];
pub const PAWN_CHAIN_BONUS: i32 = 10;
pub const CANDIDATE_PASSED_PAWN_BONUS: i32 = 15;

pub const KNIGHT_MOBILITY_BONUS: i32 = 4;
pub const BISHOP_MOBILITY_BONUS: i32 = 5;
pub const ROOK_MOBILITY_BONUS: i32 = 2;
pub const QUEEN_MOBILITY_BONUS: i32 = 1;

pub const DEVELOPMENT_BONUS_MINOR: i32 = 10;
pub const EARLY_QUEEN_MOVE_PENALTY: i32 = 15;

pub const SPACE_PER_SQUARE_BONUS: i32 = 2;
pub const CENTER_CONTROL_BONUS: i32 = 5;

pub const OPEN_FILE_BONUS: i32 = 20;
pub const SEMI_OPEN_FILE_BONUS: i32 = 10;
pub const SEVENTH_RANK_BONUS: i32 = 25;

pub const OUTPOST_BONUS: i32 = 30;
pub const BAD_BISHOP_PENALTY: i32 = 10;

pub const BISHOP_PAIR_BONUS: i32 = 30;
pub const PAWN_SHIELD_BONUS_PER_PAWN: i32 = 10;
pub const OPEN_FILE_PENALTY: i32 = 25;
pub const SEMI_OPEN_FILE_PENALTY: i32 = 15;
pub const UNDEFENDED_THREAT_DIVISOR: i32 = 10;
pub const WINNABLE_NO_PAWNS_PENALTY: i32 = 20;

pub const MATE_SCORE: i32 = 1_000_000;

/// NAG alphabet used by the classifier and the narrator's decisive-eval
/// annotations. Indices match the PGN `$n` numeric annotation glyphs.
pub const NAG_GOOD_MOVE: u8 = 1;
pub const NAG_MISTAKE: u8 = 2;
pub const NAG_BRILLIANT_MOVE: u8 = 3;
pub const NAG_BLUNDER: u8 = 4;
pub const NAG_SPECULATIVE_MOVE: u8 = 5;
pub const NAG_INACCURACY: u8 = 6;
pub const NAG_FORCED_MOVE: u8 = 8;
pub const NAG_WHITE_DECISIVE_ADVANTAGE: u8 = 18;
pub const NAG_BLACK_DECISIVE_ADVANTAGE: u8 = 19;

/// Exploration tiers, per spec: (engine depth, multipv, soft_timeout_ms, hard_timeout_ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Shallow,
    Standard,
    Full,
}

pub struct TierDefaults {
    pub depth: u32,
    pub multipv: u32,
    pub soft_timeout_ms: u64,
    pub hard_timeout_ms: u64,
}

pub fn tier_defaults(tier: Tier) -> TierDefaults {
    match tier {
        Tier::Shallow => TierDefaults {
            depth: 12,
            multipv: 1,
            soft_timeout_ms: 1500,
            hard_timeout_ms: 2000,
        },
        Tier::Standard => TierDefaults {
            depth: 18,
            multipv: 3,
            soft_timeout_ms: 5000,
            hard_timeout_ms: 4000,
        },
        Tier::Full => TierDefaults {
            depth: 22,
            multipv: 5,
            soft_timeout_ms: 15000,
            hard_timeout_ms: 6000,
        },
    }
}

/// Exploration priority formula weights:
/// `p = (w_c*crit/100 + w_i*info_gain + w_n*novelty - w_cost*cost) * max(0, 1 - depth/100) * 100`
pub const PRIORITY_WEIGHT_CRITICALITY: f64 = 1.0;
pub const PRIORITY_WEIGHT_INFO_GAIN: f64 = 1.5;
pub const PRIORITY_WEIGHT_NOVELTY: f64 = 0.8;
pub const PRIORITY_WEIGHT_COST: f64 = 0.3;

/// Per-ply side-line exploration budget at full (criticality 100) scale;
/// scaled down by `budget_multiplier` for quieter plies.
pub const EXPLORATION_MAX_NODES_FULL: usize = 12;
pub const EXPLORATION_TIME_BUDGET_MS_FULL: u64 = 2000;

/// Candidate move source priority, highest first (used for tie-breaking and
/// for the theme detector's "why was this candidate surfaced" label).
pub const SOURCE_PRIORITY_ATTRACTIVE_BUT_BAD: u8 = 10;
pub const SOURCE_PRIORITY_HUMAN_LIKELY: u8 = 8;
pub const SOURCE_PRIORITY_ENGINE_TOP: u8 = 6;
pub const SOURCE_PRIORITY_THEMATIC: u8 = 4;
pub const SOURCE_PRIORITY_REFERENCE_GAME: u8 = 3;
pub const SOURCE_PRIORITY_QUIET_IMPROVEMENT: u8 = 1;

/// Idea tracker defaults.
pub const IDEA_REEXPLAIN_THRESHOLD: u32 = 20;
pub const IDEA_DECAY_RATE: f64 = 0.05;
pub const IDEA_MIN_RELEVANCE: f64 = 0.3;
pub const IDEA_MAX_PER_SCOPE: usize = 100;

/// Line memory bounds.
pub const LINE_MEMORY_MAX_ROLLING_SUMMARY: usize = 15;
pub const LINE_MEMORY_MAX_EVAL_TREND: usize = 100;

/// Rolling-summary entry priorities (higher survives pruning longer).
pub const SUMMARY_PRIORITY_EVAL_SWING: u8 = 4;
pub const SUMMARY_PRIORITY_THEME_EMERGED: u8 = 3;
pub const SUMMARY_PRIORITY_STRUCTURAL_CHANGE: u8 = 3;
pub const SUMMARY_PRIORITY_PLAN_SHIFT: u8 = 2;
pub const SUMMARY_PRIORITY_OTHER: u8 = 1;

/// Intent scoring weights.
pub const INTENT_WEIGHT_CRITICALITY: f64 = 0.35;
pub const INTENT_WEIGHT_THEME_NOVELTY: f64 = 0.25;
pub const INTENT_WEIGHT_INSTRUCTIONAL_VALUE: f64 = 0.25;
pub const INTENT_WEIGHT_REDUNDANCY_PENALTY: f64 = 0.15;

/// Mandatory-intent cp-swing threshold.
pub const MANDATORY_INTENT_CP_SWING: i32 = 150;

pub struct DensityPreset {
    pub window: usize,
    pub max_per_window: usize,
    pub max_consecutive: usize,
    pub hard_ratio_cap: f64,
}

pub fn density_preset(density: Density) -> DensityPreset {
    match density {
        Density::Sparse => DensityPreset {
            window: 10,
            max_per_window: 2,
            max_consecutive: 1,
            hard_ratio_cap: 0.25,
        },
        Density::Normal => DensityPreset {
            window: 3,
            max_per_window: 2,
            max_consecutive: 2,
            hard_ratio_cap: 0.25,
        },
        Density::Verbose => DensityPreset {
            window: 10,
            max_per_window: 7,
            max_consecutive: 3,
            hard_ratio_cap: 0.75,
        },
    }
}

/// Circuit breaker defaults for the LLM client.
pub const CIRCUIT_FAILURE_THRESHOLD: u32 = 5;
pub const CIRCUIT_SUCCESS_THRESHOLD: u32 = 2;
pub const CIRCUIT_RESET_TIMEOUT_SECS: u64 = 30;

/// Default artifact-store per-kind bucket capacities.
pub const LRU_CAPACITY_ENGINE_EVAL: usize = 5000;
pub const LRU_CAPACITY_THEMES: usize = 3000;
pub const LRU_CAPACITY_CANDIDATES: usize = 2000;
pub const LRU_CAPACITY_MOVE_ASSESSMENT: usize = 4000;
pub const LRU_CAPACITY_HCE: usize = 2000;
pub const LRU_TTL_SECS: u64 = 3600;
