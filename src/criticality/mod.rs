//! Criticality/multipv scorer: how sharp a position is, and how many
//! engine lines are worth requesting.

use crate::constants::Tier;

pub struct CriticalityOutput {
    pub score: f64,
    pub recommended_tier: Tier,
}

/// `eval_before_stm`/`eval_after_opp` are both cp, side-to-move-relative at
/// the moment they were computed. Criticality is high when a small material
/// or positional change swings the evaluation sharply, signalling a
/// forcing/tactical position rather than a quiet one.
pub fn criticality(eval_before_stm: i32, eval_after_opp: i32) -> CriticalityOutput {
    let swing = (eval_before_stm - (-eval_after_opp)).unsigned_abs() as f64;
    let score = (swing / 10.0).min(100.0);
    let recommended_tier = if score >= 60.0 {
        Tier::Full
    } else if score >= 25.0 {
        Tier::Standard
    } else {
        Tier::Shallow
    };
    CriticalityOutput { score, recommended_tier }
}

pub fn recommend_multipv(score: f64, tier: Tier) -> u32 {
    let base = crate::constants::tier_defaults(tier).multipv;
    if score >= 80.0 {
        base + 2
    } else if score >= 50.0 {
        base + 1
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_swing_recommends_full_tier() {
        let out = criticality(0, -700);
        assert!(out.score >= 60.0);
        assert_eq!(out.recommended_tier, Tier::Full);
    }

    #[test]
    fn quiet_position_recommends_shallow_tier() {
        let out = criticality(10, -15);
        assert_eq!(out.recommended_tier, Tier::Shallow);
    }

    #[test]
    fn multipv_scales_with_score() {
        assert!(recommend_multipv(90.0, Tier::Standard) > recommend_multipv(10.0, Tier::Standard));
    }
}
