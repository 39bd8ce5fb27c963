//! Weakness detectors: back-rank mate vulnerability, f2/f7 weakness,
//! trapped pieces, and domination.
//!
//! Grounded on the teacher's `king_attack.rs` (`get_king_zone`) and
//! `king_safety.rs` for king-zone geometry.

use shakmaty::{attacks, Bitboard, Color, Rank, Role, Square};

use crate::artifact::{DetectedTheme, ThemeCategory};
use crate::position::Position;
use crate::theme::geometry::piece_value;
use crate::theme::theme;

pub fn detect_back_rank(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    for color in [Color::White, Color::Black] {
        let home_rank = if color == Color::White { Rank::First } else { Rank::Eighth };
        let king_sq = match board.king_of(color) {
            Some(k) => k,
            None => continue,
        };
        if king_sq.rank() != home_rank {
            continue;
        }
        let own_pawn_shield = board.by_piece(shakmaty::Piece { role: Role::Pawn, color });
        let blocking_pawns = (attacks::king_attacks(king_sq) & own_pawn_shield).count();
        let enemy_majors = board.by_color(!color) & (board.by_role(Role::Rook) | board.by_role(Role::Queen));
        if blocking_pawns < 2 || enemy_majors.is_empty() {
            continue;
        }
        let escape_squares = attacks::king_attacks(king_sq) & !Bitboard::from_rank(home_rank) & !board.by_color(color);
        let occupied = board.occupied();
        let blocked_escapes = escape_squares
            .into_iter()
            .filter(|&sq| {
                // An escape square is unusable if it's attacked by the enemy.
                let mut attacked = false;
                for from in board.by_color(!color) {
                    if let Some(piece) = board.piece_at(from) {
                        if attacks::attacks(from, piece, occupied).contains(sq) {
                            attacked = true;
                            break;
                        }
                    }
                }
                attacked
            })
            .count();
        let shield_blocks_escape = escape_squares.into_iter().filter(|sq| own_pawn_shield.contains(*sq)).count();

        if escape_squares.count() as usize == blocked_escapes + shield_blocks_escape {
            out.push(theme(
                "back_rank_weakness",
                ThemeCategory::Weakness,
                !color,
                vec![king_sq],
                format!("{:?} king is vulnerable on the back rank", color),
                6,
            ));
        }
    }
    out
}

pub fn detect_king_shelter_weaknesses(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    for color in [Color::White, Color::Black] {
        let f_square = if color == Color::White { Square::F2 } else { Square::F7 };
        let pawn_present = board
            .piece_at(f_square)
            .map(|p| p.role == Role::Pawn && p.color == color)
            .unwrap_or(false);
        if !pawn_present {
            let king_sq = board.king_of(color);
            let king_nearby = king_sq
                .map(|k| (k.file() as i32 - f_square.file() as i32).abs() <= 2 && (k.rank() as i32 - f_square.rank() as i32).abs() <= 2)
                .unwrap_or(false);
            if king_nearby {
                out.push(theme(
                    "f_pawn_weakness",
                    ThemeCategory::Weakness,
                    !color,
                    vec![f_square],
                    format!("the {} square is undefended by a pawn near the king", f_square),
                    4,
                ));
            }
        }
    }
    out
}

pub fn detect_trapped_and_domination(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();
    let occupied = board.occupied();

    for color in [Color::White, Color::Black] {
        let enemy = !color;
        let enemy_attacks = {
            let mut bb = Bitboard::EMPTY;
            for sq in board.by_color(enemy) {
                if let Some(piece) = board.piece_at(sq) {
                    bb |= attacks::attacks(sq, piece, occupied);
                }
            }
            bb
        };

        for sq in board.by_color(color) & !board.kings() & !board.pawns() {
            let piece = board.piece_at(sq).unwrap();
            let moves = attacks::attacks(sq, piece, occupied) & !board.by_color(color);
            let safe_moves = moves.into_iter().filter(|&to| !enemy_attacks.contains(to)).count();
            if moves.count() > 0 && safe_moves == 0 {
                out.push(theme(
                    "trapped_piece",
                    ThemeCategory::Weakness,
                    enemy,
                    vec![sq],
                    format!("{:?} on {sq} has no safe squares", piece.role),
                    5,
                ));
            }
            if safe_moves == 0 && moves.count() == 0 && piece_value(piece.role) > 0 {
                out.push(theme(
                    "dominated_piece",
                    ThemeCategory::Weakness,
                    enemy,
                    vec![sq],
                    format!("{:?} on {sq} is completely immobilized", piece.role),
                    5,
                ));
            }
        }
    }
    out
}
