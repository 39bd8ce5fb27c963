//! The `Position` collaborator: a thin wrapper around `shakmaty::Chess`
//! exposing the move/legality/attack-query surface the rest of the crate
//! needs, plus position keying and PGN parse/render.

pub mod key;

use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{Board, CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position as _, Role, Square};

use crate::error::{AnnotatorError, Result};
pub use key::PositionKey;

/// A chess position together with the FEN it was parsed from.
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
}

impl Position {
    pub fn new_initial() -> Self {
        Self {
            chess: Chess::default(),
        }
    }

    pub fn from_chess(chess: Chess) -> Self {
        Self { chess }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let parsed: shakmaty::fen::Fen = fen
            .parse()
            .map_err(|_| AnnotatorError::InvalidFen(fen.to_string()))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| AnnotatorError::InvalidFen(fen.to_string()))?;
        Ok(Self { chess })
    }

    pub fn fen(&self) -> String {
        shakmaty::fen::Fen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    pub fn key(&self) -> PositionKey {
        let normalized = self
            .fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ");
        PositionKey::from_position(&self.chess, normalized)
    }

    pub fn turn(&self) -> Color {
        self.chess.turn()
    }

    pub fn board(&self) -> &Board {
        self.chess.board()
    }

    pub fn chess(&self) -> &Chess {
        &self.chess
    }

    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    pub fn is_game_over(&self) -> bool {
        self.chess.is_game_over()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.chess.legal_moves().to_vec()
    }

    pub fn is_legal_uci(&self, uci: &str) -> bool {
        self.parse_uci(uci).is_ok()
    }

    fn parse_uci(&self, uci: &str) -> Result<Move> {
        let uci_move: UciMove = uci
            .parse()
            .map_err(|_| self.illegal(uci))?;
        uci_move.to_move(&self.chess).map_err(|_| self.illegal(uci))
    }

    fn illegal(&self, uci: &str) -> AnnotatorError {
        AnnotatorError::IllegalMove {
            fen: self.fen(),
            uci: uci.to_string(),
        }
    }

    /// Plays a move given in UCI notation, returning the resulting position.
    pub fn play_uci(&self, uci: &str) -> Result<Position> {
        let m = self.parse_uci(uci)?;
        let mut chess = self.chess.clone();
        chess.play_unchecked(m);
        Ok(Position { chess })
    }

    pub fn uci_to_san(&self, uci: &str) -> Result<String> {
        let m = self.parse_uci(uci)?;
        Ok(SanPlus::from_move(self.chess.clone(), m).to_string())
    }

    pub fn san_to_uci(&self, san: &str) -> Result<String> {
        let san: San = san
            .parse()
            .map_err(|_| AnnotatorError::IllegalMove {
                fen: self.fen(),
                uci: san.to_string(),
            })?;
        let m = san.to_move(&self.chess).map_err(|_| AnnotatorError::IllegalMove {
            fen: self.fen(),
            uci: san.to_string(),
        })?;
        Ok(UciMove::from_standard(m).to_string())
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess.board().piece_at(square)
    }

    pub fn all_pieces(&self, color: Color) -> Vec<(Square, Role)> {
        self.chess
            .board()
            .by_color(color)
            .into_iter()
            .filter_map(|sq| self.chess.board().role_at(sq).map(|r| (sq, r)))
            .collect()
    }

    /// Squares of `color`'s pieces that attack `square`.
    pub fn attackers(&self, square: Square, color: Color) -> Vec<Square> {
        let board = self.chess.board();
        let occupied = board.occupied();
        let mut result = Vec::new();
        for from in board.by_color(color) {
            if let Some(piece) = board.piece_at(from) {
                let attacked = shakmaty::attacks::attacks(from, piece, occupied);
                if attacked.contains(square) {
                    result.push(from);
                }
            }
        }
        result
    }

    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        !self.attackers(square, by).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_uci_and_san() {
        let pos = Position::new_initial();
        let san = pos.uci_to_san("e2e4").unwrap();
        assert_eq!(san, "e4");
        let uci = pos.san_to_uci("e4").unwrap();
        assert_eq!(uci, "e2e4");
    }

    #[test]
    fn rejects_illegal_moves() {
        let pos = Position::new_initial();
        assert!(pos.play_uci("e2e5").is_err());
    }

    #[test]
    fn detects_check() {
        // Scholar's mate setup minus the final move.
        let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(pos.is_check());
    }
}
