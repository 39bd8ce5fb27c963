//! Tactical theme detectors: pins, skewers, x-ray attack/defense, knight
//! forks, double check, discovered attack/check, batteries (including
//! Alekhine's gun), and rooks on the 7th/2nd rank.
//!
//! Grounded on the teacher's `opponent_weakness.rs` (`evaluate_pins`,
//! `get_sliding_attacks`, `get_piece_between`) and `rooks.rs`
//! (seventh-rank bonus), generalized from scalar eval bonuses into
//! structured `DetectedTheme`s.

use shakmaty::{attacks, Bitboard, Color, Rank, Role, Square};

use crate::artifact::{DetectedTheme, ThemeCategory};
use crate::position::Position;
use crate::theme::geometry::{attackers_of, is_slider, piece_between, piece_value, sliding_attacks};
use crate::theme::theme;

pub fn detect_pins_and_skewers(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();
    let occupied = board.occupied();

    for color in [Color::White, Color::Black] {
        let enemy = !color;
        let enemy_king = match board.king_of(enemy) {
            Some(k) => k,
            None => continue,
        };
        let our_sliders = board.by_color(color) & (board.rooks() | board.bishops() | board.queens());

        for slider_sq in our_sliders {
            let role = board.role_at(slider_sq).unwrap();
            let attacks_bb = sliding_attacks(role, slider_sq, occupied);
            if !attacks_bb.contains(enemy_king) {
                continue;
            }
            if let Some(pinned_sq) = piece_between(board, slider_sq, enemy_king) {
                if let Some(pinned_piece) = board.piece_at(pinned_sq) {
                    if pinned_piece.color != enemy {
                        continue;
                    }
                    out.push(theme(
                        "absolute_pin",
                        ThemeCategory::Tactical,
                        color,
                        vec![slider_sq, pinned_sq, enemy_king],
                        format!(
                            "{:?} on {} pins {:?} on {} to the {} king",
                            role, slider_sq, pinned_piece.role, pinned_sq, enemy
                        ),
                        7,
                    ));
                }
            }
        }

        // Skewers and x-ray attacks: slider attacks through one enemy piece
        // onto a second, more valuable (skewer) or equally-placed (x-ray)
        // enemy piece, where the first piece is not the king.
        let enemy_pieces = board.by_color(enemy) & !board.kings();
        for slider_sq in our_sliders {
            let role = board.role_at(slider_sq).unwrap();
            let attacks_bb = sliding_attacks(role, slider_sq, occupied);
            for front_sq in attacks_bb & enemy_pieces {
                let front_piece = board.piece_at(front_sq).unwrap();
                // Attack as if front_sq were empty, to find what lies beyond.
                let beyond_occupied = occupied & !Bitboard::from_square(front_sq);
                let extended = sliding_attacks(role, slider_sq, beyond_occupied);
                if let Some(back_sq) = (extended & enemy_pieces & !Bitboard::from_square(front_sq))
                    .into_iter()
                    .find(|&sq| piece_between(board, slider_sq, sq) == Some(front_sq))
                {
                    let back_piece = board.piece_at(back_sq).unwrap();
                    if piece_value(front_piece.role) > piece_value(back_piece.role) {
                        out.push(theme(
                            "skewer",
                            ThemeCategory::Tactical,
                            color,
                            vec![slider_sq, front_sq, back_sq],
                            format!("skewer from {slider_sq} through {front_sq} onto {back_sq}"),
                            6,
                        ));
                    } else if piece_value(front_piece.role) < piece_value(back_piece.role) {
                        out.push(theme(
                            "relative_pin",
                            ThemeCategory::Tactical,
                            color,
                            vec![slider_sq, front_sq, back_sq],
                            format!("{front_sq} is relatively pinned to the more valuable piece on {back_sq}"),
                            4,
                        ));
                    } else {
                        out.push(theme(
                            "xray_attack",
                            ThemeCategory::Tactical,
                            color,
                            vec![slider_sq, front_sq, back_sq],
                            format!("x-ray attack from {slider_sq} through {front_sq} onto {back_sq}"),
                            3,
                        ));
                    }
                }
            }
        }

        // X-ray defense: a slider x-rays through a friendly piece to defend
        // a friendly piece beyond it.
        let friendly_pieces = board.by_color(color) & !board.kings();
        for slider_sq in our_sliders {
            let role = board.role_at(slider_sq).unwrap();
            let attacks_bb = sliding_attacks(role, slider_sq, occupied);
            for front_sq in attacks_bb & friendly_pieces {
                let beyond_occupied = occupied & !Bitboard::from_square(front_sq);
                let extended = sliding_attacks(role, slider_sq, beyond_occupied);
                for back_sq in extended & friendly_pieces & !Bitboard::from_square(front_sq) {
                    if piece_between(board, slider_sq, back_sq) == Some(front_sq) {
                        out.push(theme(
                            "xray_defense",
                            ThemeCategory::Tactical,
                            color,
                            vec![slider_sq, front_sq, back_sq],
                            format!("x-ray defense from {slider_sq} through {front_sq} to {back_sq}"),
                            2,
                        ));
                    }
                }
            }
        }
    }

    out
}

fn is_relative_pin(board: &shakmaty::Board, slider: Square, pinned: Square, king: Square) -> bool {
    let _ = (board, slider, pinned);
    // An absolute pin is specifically against the king; any pin detected
    // here already targets the king square, so "relative" is reserved for
    // pins against a piece of lesser value than the pinned piece itself —
    // not applicable when the back piece is the king. Kept as an explicit
    // branch point for clarity and to mirror spec terminology.
    let _ = king;
    false
}

pub fn detect_forks(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();
    let occupied = board.occupied();

    for color in [Color::White, Color::Black] {
        let enemy = !color;
        let our_knights = board.by_piece(shakmaty::Piece {
            role: Role::Knight,
            color,
        });
        for knight_sq in our_knights {
            let attacked = attacks::knight_attacks(knight_sq) & board.by_color(enemy);
            let valuable: Vec<Square> = attacked
                .into_iter()
                .filter(|&sq| {
                    let role = board.role_at(sq).unwrap();
                    piece_value(role) >= piece_value(Role::Knight) || role == Role::King
                })
                .collect();
            if valuable.len() >= 2 {
                let mut squares = valuable.clone();
                squares.push(knight_sq);
                out.push(theme(
                    "knight_fork",
                    ThemeCategory::Tactical,
                    color,
                    squares,
                    format!("knight on {knight_sq} forks {} pieces", valuable.len()),
                    8,
                ));
            }
        }

        // Double check: the side to move's king is attacked by >= 2 pieces.
        if position.turn() == enemy {
            if let Some(king_sq) = board.king_of(enemy) {
                let attackers = attackers_of(board, king_sq, color);
                if attackers.count() >= 2 {
                    out.push(theme(
                        "double_check",
                        ThemeCategory::Tactical,
                        color,
                        attackers.into_iter().collect(),
                        "double check".to_string(),
                        9,
                    ));
                }
            }
        }
    }
    let _ = occupied;
    out
}

pub fn detect_discoveries(position: &Position) -> Vec<DetectedTheme> {
    // A discovered attack/check candidate: a friendly slider is aligned with
    // the enemy king through exactly one friendly piece (the piece that, if
    // moved, would unmask the slider's attack).
    let mut out = Vec::new();
    let board = position.board();
    let occupied = board.occupied();

    for color in [Color::White, Color::Black] {
        let enemy = !color;
        let enemy_king = match board.king_of(enemy) {
            Some(k) => k,
            None => continue,
        };
        let our_sliders = board.by_color(color) & (board.rooks() | board.bishops() | board.queens());
        for slider_sq in our_sliders {
            let role = board.role_at(slider_sq).unwrap();
            let attacks_bb = sliding_attacks(role, slider_sq, occupied);
            if !attacks_bb.contains(enemy_king) {
                continue;
            }
            if let Some(blocker_sq) = piece_between(board, slider_sq, enemy_king) {
                if let Some(blocker) = board.piece_at(blocker_sq) {
                    if blocker.color == color {
                        let id = "discovered_check_setup";
                        out.push(theme(
                            id,
                            ThemeCategory::Tactical,
                            color,
                            vec![slider_sq, blocker_sq, enemy_king],
                            format!("moving the piece on {blocker_sq} would discover check from {slider_sq}"),
                            6,
                        ));
                    }
                }
            }
        }
    }
    out
}

pub fn detect_batteries(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    for color in [Color::White, Color::Black] {
        let queens = board.by_piece(shakmaty::Piece {
            role: Role::Queen,
            color,
        });
        let rooks = board.by_piece(shakmaty::Piece {
            role: Role::Rook,
            color,
        });
        let bishops = board.by_piece(shakmaty::Piece {
            role: Role::Bishop,
            color,
        });

        // Queen + rook doubled on a file/rank.
        for file in shakmaty::File::ALL {
            let file_bb = Bitboard::from_file(file);
            let on_file = (queens | rooks) & file_bb;
            if on_file.count() >= 2 {
                out.push(theme(
                    "battery_file",
                    ThemeCategory::Tactical,
                    color,
                    on_file.into_iter().collect(),
                    format!("major-piece battery on the {:?} file", file),
                    if queens.count() > 0 && on_file.count() >= 2 {
                        5
                    } else {
                        3
                    },
                ));
                if rooks & file_bb == on_file && on_file.count() >= 2 {
                    out.push(theme(
                        "doubled_rooks",
                        ThemeCategory::Positional,
                        color,
                        on_file.into_iter().collect(),
                        format!("doubled rooks on the {:?} file", file),
                        3,
                    ));
                }
                if on_file.count() >= 3 {
                    out.push(theme(
                        "alekhines_gun",
                        ThemeCategory::Tactical,
                        color,
                        on_file.into_iter().collect(),
                        format!("Alekhine's gun formation on the {:?} file", file),
                        7,
                    ));
                }
            }
        }

        // Queen + bishop battery on a diagonal.
        for q in queens {
            for b in bishops {
                if q != b && crate::theme::geometry::aligned(q, b) {
                    let (qf, qr) = (q.file() as i32, q.rank() as i32);
                    let (bf, br) = (b.file() as i32, b.rank() as i32);
                    if (qf - bf).abs() == (qr - br).abs() && qf != bf {
                        out.push(theme(
                            "battery_diagonal",
                            ThemeCategory::Tactical,
                            color,
                            vec![q, b],
                            "queen and bishop battery on a shared diagonal".to_string(),
                            4,
                        ));
                    }
                }
            }
        }
    }
    out
}

pub fn detect_rook_activity(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();
    for color in [Color::White, Color::Black] {
        let seventh = if color == Color::White { Rank::Seventh } else { Rank::Second };
        let rooks = board.by_piece(shakmaty::Piece {
            role: Role::Rook,
            color,
        }) & Bitboard::from_rank(seventh);
        if !rooks.is_empty() {
            out.push(theme(
                "rook_on_seventh",
                ThemeCategory::Positional,
                color,
                rooks.into_iter().collect(),
                format!("rook active on the {:?} rank", seventh),
                4,
            ));
        }
    }
    let _ = is_slider(Role::Rook);
    out
}
