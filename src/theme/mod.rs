//! Theme detector: tactical, positional, and weakness pattern recognition
//! over a `shakmaty::Board`, tiered shallow/standard/full.

pub mod geometry;
pub mod positional;
pub mod tactical;
pub mod weaknesses;

use crate::artifact::{DetectedTheme, ThemeCategory};
use crate::constants::Tier;
use crate::position::Position;

/// Runs the theme detector at the given tier, deduping by (id, beneficiary,
/// sorted squares).
pub fn detect(position: &Position, tier: Tier) -> Vec<DetectedTheme> {
    let mut themes = Vec::new();

    themes.extend(tactical::detect_pins_and_skewers(position));
    themes.extend(tactical::detect_forks(position));
    themes.extend(tactical::detect_discoveries(position));
    if tier >= Tier::Standard {
        themes.extend(tactical::detect_batteries(position));
    }
    if tier >= Tier::Full {
        themes.extend(tactical::detect_rook_activity(position));
    }

    themes.extend(positional::detect_pawn_structure(position));
    if tier >= Tier::Standard {
        themes.extend(positional::detect_files_and_outposts(position));
        themes.extend(positional::detect_space_and_development(position));
    }

    themes.extend(weaknesses::detect_back_rank(position));
    if tier >= Tier::Standard {
        themes.extend(weaknesses::detect_king_shelter_weaknesses(position));
    }
    if tier >= Tier::Full {
        themes.extend(weaknesses::detect_trapped_and_domination(position));
    }

    dedup(themes)
}

fn dedup(mut themes: Vec<DetectedTheme>) -> Vec<DetectedTheme> {
    let mut seen = std::collections::HashSet::new();
    themes.retain(|t| {
        let mut squares = t.squares.clone();
        squares.sort_by_key(|s| s.to_string());
        let key = (t.id.clone(), t.beneficiary, squares.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        seen.insert(key)
    });
    themes
}

pub(crate) fn theme(
    id: &str,
    category: ThemeCategory,
    beneficiary: shakmaty::Color,
    mut squares: Vec<shakmaty::Square>,
    description: String,
    severity: u8,
) -> DetectedTheme {
    squares.sort_by_key(|s| s.to_string());
    DetectedTheme {
        id: id.to_string(),
        category,
        beneficiary,
        squares,
        description,
        severity,
    }
}
