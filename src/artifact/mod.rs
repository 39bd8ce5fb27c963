//! Artifact types produced by collaborators and cached by the artifact
//! store: engine evaluations, detected themes, candidate moves, move
//! assessments, and hand-crafted-evaluation (HCE) factor breakdowns.

pub mod lru;
pub mod store;

pub use store::{ArtifactStore, StoreStats};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `shakmaty::Color` does not implement `serde::{Serialize, Deserialize}`
/// even with its `serde` feature enabled, so it is round-tripped through its
/// one-character notation here.
mod color_serde {
    use super::*;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(color: &shakmaty::Color, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(color.char())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<shakmaty::Color, D::Error> {
        let ch = char::deserialize(d)?;
        shakmaty::Color::from_str(&ch.to_string()).map_err(serde::de::Error::custom)
    }
}

/// `shakmaty::Square` does not implement `serde::{Serialize, Deserialize}`
/// even with its `serde` feature enabled, so it is round-tripped through its
/// algebraic notation (e.g. "e4") here.
mod square_vec_serde {
    use super::*;

    pub fn serialize<S: Serializer>(squares: &[shakmaty::Square], s: S) -> Result<S::Ok, S::Error> {
        let names: Vec<String> = squares.iter().map(|sq| sq.to_string()).collect();
        names.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<shakmaty::Square>, D::Error> {
        let names = Vec::<String>::deserialize(d)?;
        names
            .into_iter()
            .map(|name| shakmaty::Square::from_ascii(name.as_bytes()).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeCategory {
    Tactical,
    Positional,
    Weakness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTheme {
    pub id: String,
    pub category: ThemeCategory,
    /// Which side the theme favors.
    #[serde(with = "color_serde")]
    pub beneficiary: shakmaty::Color,
    /// Squares involved, sorted, used for dedup.
    #[serde(with = "square_vec_serde")]
    pub squares: Vec<shakmaty::Square>,
    pub description: String,
    pub severity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CandidateSource {
    AttractiveButBad,
    HumanLikely,
    EngineTop,
    Thematic,
    ReferenceGame,
    QuietImprovement,
}

impl CandidateSource {
    pub fn priority(self) -> u8 {
        use crate::constants::*;
        match self {
            CandidateSource::AttractiveButBad => SOURCE_PRIORITY_ATTRACTIVE_BUT_BAD,
            CandidateSource::HumanLikely => SOURCE_PRIORITY_HUMAN_LIKELY,
            CandidateSource::EngineTop => SOURCE_PRIORITY_ENGINE_TOP,
            CandidateSource::Thematic => SOURCE_PRIORITY_THEMATIC,
            CandidateSource::ReferenceGame => SOURCE_PRIORITY_REFERENCE_GAME,
            CandidateSource::QuietImprovement => SOURCE_PRIORITY_QUIET_IMPROVEMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMove {
    pub uci: String,
    pub source: CandidateSource,
    pub eval_cp: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvLine {
    pub eval_cp: i32,
    pub moves_uci: Vec<String>,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEval {
    pub lines: Vec<PvLine>,
    pub depth: u32,
    pub multipv: u32,
}

impl EngineEval {
    pub fn best_cp(&self) -> Option<i32> {
        self.lines.first().map(|l| l.eval_cp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Brilliant,
    Excellent,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
    Forced,
    Book,
}

/// Spec severity band for a move assessment, independent of the narrator's
/// per-theme `u8` severity scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Significant,
    Minor,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAssessment {
    pub classification: Classification,
    pub nags: Vec<u8>,
    pub cp_delta: i32,
    pub cp_loss: i32,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HceFactor {
    pub mg: i32,
    pub eg: i32,
}

impl HceFactor {
    pub fn interpolated(self, phase: i32, total_phase: i32) -> i32 {
        (self.mg * phase + self.eg * (total_phase - phase)) / total_phase.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hce {
    pub material: HceFactor,
    pub imbalance: HceFactor,
    pub pawns: HceFactor,
    pub knights: HceFactor,
    pub bishops: HceFactor,
    pub rooks: HceFactor,
    pub queens: HceFactor,
    pub mobility: HceFactor,
    pub king_safety: HceFactor,
    pub threats: HceFactor,
    pub passed: HceFactor,
    pub space: HceFactor,
    pub winnable: HceFactor,
    pub game_phase: i32,
    pub final_eval_cp: i32,
}
