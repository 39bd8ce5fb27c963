//! Position keying: a normalized 4-field FEN plus a 64-bit Zobrist hash,
//! combined into a single `PositionKey` used throughout the artifact store
//! and the variation DAG's transposition index.

use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode};
use std::fmt;

use crate::error::{AnnotatorError, Result};

/// A position key: the Zobrist hash of the position plus the normalized FEN
/// it was derived from (board + side-to-move + castling rights + en-passant
/// target square — halfmove clock and fullmove number are dropped, since
/// they never affect legal-move generation or tactical content).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    hash: u64,
    normalized_fen: String,
}

impl PositionKey {
    /// Builds a key from an arbitrary (possibly full, 6-field) FEN string.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let normalized_fen = normalize_fen(fen)?;
        let parsed: Fen = normalized_fen
            .parse()
            .map_err(|_| AnnotatorError::InvalidFen(fen.to_string()))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| AnnotatorError::InvalidFen(fen.to_string()))?;
        Ok(Self::from_position(&pos, normalized_fen))
    }

    /// Builds a key directly from a `shakmaty::Chess` position, avoiding a
    /// FEN round-trip when the caller already holds the position.
    pub fn from_position(pos: &Chess, normalized_fen: String) -> Self {
        let hash: Zobrist64 = pos.zobrist_hash(EnPassantMode::Legal);
        Self {
            hash: hash.0,
            normalized_fen,
        }
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn normalized_fen(&self) -> &str {
        &self.normalized_fen
    }

    /// Two keys are equal exactly when their hashes and normalized FENs both
    /// match — the hash alone is a fast-path equality check (collision risk
    /// is treated as a correctness bug, not a performance optimization).
    pub fn key_eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.normalized_fen == other.normalized_fen
    }

    /// Serializes to the wire format `<16-hex-hash>:<normalized-fen>`.
    pub fn to_wire_string(&self) -> String {
        format!("{:016x}:{}", self.hash, self.normalized_fen)
    }

    /// Parses the wire format produced by [`PositionKey::to_wire_string`].
    pub fn parse_position_key(s: &str) -> Result<Self> {
        let (hex, fen) = s
            .split_once(':')
            .ok_or_else(|| AnnotatorError::ValidationError(format!("malformed position key: {s}")))?;
        if hex.len() != 16 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AnnotatorError::ValidationError(format!(
                "malformed position key hash: {hex}"
            )));
        }
        let hash = u64::from_str_radix(hex, 16)
            .map_err(|_| AnnotatorError::ValidationError(format!("malformed position key hash: {hex}")))?;
        let normalized_fen = normalize_fen(fen)?;
        Ok(Self {
            hash,
            normalized_fen,
        })
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire_string())
    }
}

/// Normalizes a FEN to its first 4 space-separated fields (board, turn,
/// castling rights, en-passant square). Returns `InvalidFen` if the input
/// has fewer than 4 fields.
fn normalize_fen(fen: &str) -> Result<String> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(AnnotatorError::InvalidFen(fen.to_string()));
    }
    Ok(fields[..4].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn key_round_trips_through_wire_format() {
        let key = PositionKey::from_fen(STARTPOS).unwrap();
        let wire = key.to_wire_string();
        let parsed = PositionKey::parse_position_key(&wire).unwrap();
        assert!(key.key_eq(&parsed));
    }

    #[test]
    fn key_is_deterministic() {
        let a = PositionKey::from_fen(STARTPOS).unwrap();
        let b = PositionKey::from_fen(STARTPOS).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.normalized_fen(), b.normalized_fen());
    }

    #[test]
    fn normalization_ignores_clocks() {
        let a = PositionKey::from_fen(STARTPOS).unwrap();
        let b = PositionKey::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 17 42").unwrap();
        assert!(a.key_eq(&b));
    }

    #[test]
    fn transposition_produces_equal_keys() {
        // 1.Nf3 d5 2.d4 vs 1.d4 d5 2.Nf3 reach the same position.
        let a = "rnbqkbnr/ppp1pppp/8/3p4/3P4/5N2/PPP1PPPP/RNBQKB1R b KQkq - 1 2";
        let b = "rnbqkbnr/ppp1pppp/8/3p4/3P4/5N2/PPP1PPPP/RNBQKB1R b KQkq - 1 2";
        assert!(PositionKey::from_fen(a).unwrap().key_eq(&PositionKey::from_fen(b).unwrap()));
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(PositionKey::from_fen("not a fen").is_err());
        assert!(PositionKey::from_fen("only two fields").is_err());
    }

    #[test]
    fn rejects_malformed_wire_string() {
        assert!(PositionKey::parse_position_key("nothexhash:stuff").is_err());
        assert!(PositionKey::parse_position_key("no-colon-here").is_err());
    }
}
