//! Positional theme detectors: pawn structure (passed/isolated/doubled/
//! backward), open/semi-open files, outposts, space advantage, and
//! development lead.
//!
//! Grounded on the teacher's `pawn_structure.rs`, `advanced_pawn_structure.rs`,
//! `passed_pawns.rs`, `rooks.rs` (`evaluate_file`), `opponent_weakness.rs`
//! (outpost/weak-square detection), `space.rs`, and `development.rs`.

use shakmaty::{attacks, Bitboard, Color, File, Piece, Rank, Role, Square};

use crate::artifact::{DetectedTheme, ThemeCategory};
use crate::position::Position;
use crate::theme::theme;

fn adjacent_files(file: File) -> Bitboard {
    let idx = file as u32;
    let mut bb = Bitboard::EMPTY;
    if idx > 0 {
        bb |= Bitboard::from_file(File::new(idx - 1));
    }
    if idx < 7 {
        bb |= Bitboard::from_file(File::new(idx + 1));
    }
    bb
}

fn forward_ranks(color: Color, rank: Rank) -> Bitboard {
    let idx = rank as u32;
    let mut bb = Bitboard::EMPTY;
    match color {
        Color::White => {
            for r in (idx + 1)..8 {
                bb |= Bitboard::from_rank(Rank::new(r));
            }
        }
        Color::Black => {
            for r in 0..idx {
                bb |= Bitboard::from_rank(Rank::new(r));
            }
        }
    }
    bb
}

pub fn detect_pawn_structure(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    for color in [Color::White, Color::Black] {
        let our_pawns = board.by_piece(Piece { role: Role::Pawn, color });
        let their_pawns = board.by_piece(Piece {
            role: Role::Pawn,
            color: !color,
        });

        // Doubled pawns: two+ pawns sharing a file.
        for file in File::ALL {
            let on_file = our_pawns & Bitboard::from_file(file);
            if on_file.count() >= 2 {
                out.push(theme(
                    "doubled_pawn",
                    ThemeCategory::Positional,
                    color,
                    on_file.into_iter().collect(),
                    format!("doubled pawns on the {:?} file", file),
                    2,
                ));
            }
        }

        for pawn_sq in our_pawns {
            let file = pawn_sq.file();
            let rank = pawn_sq.rank();

            // Isolated: no friendly pawn on adjacent files.
            if (our_pawns & adjacent_files(file)).is_empty() {
                out.push(theme(
                    "isolated_pawn",
                    ThemeCategory::Positional,
                    color,
                    vec![pawn_sq],
                    format!("isolated pawn on {pawn_sq}"),
                    3,
                ));
            }

            // Backward: no friendly pawn on an adjacent file able to support
            // this pawn's square.
            if is_backward(pawn_sq, color, our_pawns) {
                out.push(theme(
                    "backward_pawn",
                    ThemeCategory::Positional,
                    color,
                    vec![pawn_sq],
                    format!("backward pawn on {pawn_sq}"),
                    2,
                ));
            }

            // Passed: no enemy pawn on its file or adjacent files ahead of it.
            let front_files = Bitboard::from_file(file) | adjacent_files(file);
            let front_squares = forward_ranks(color, rank);
            if (their_pawns & front_files & front_squares).is_empty() {
                let rank_idx = if color == Color::White { rank as usize } else { 7 - rank as usize };
                out.push(theme(
                    "passed_pawn",
                    ThemeCategory::Positional,
                    color,
                    vec![pawn_sq],
                    format!("passed pawn on {pawn_sq}"),
                    3 + (rank_idx as u8 / 2),
                ));
            }
        }
    }
    out
}

fn is_backward(pawn_sq: Square, color: Color, our_pawns: Bitboard) -> bool {
    let file_idx = pawn_sq.file() as u32;
    let rank_idx = pawn_sq.rank() as u32;
    let behind_rank_idx = if color == Color::White {
        rank_idx.saturating_sub(1)
    } else {
        (rank_idx + 1).min(7)
    };
    let support_squares = adjacent_files(pawn_sq.file()) & Bitboard::from_rank(Rank::new(behind_rank_idx));
    (our_pawns & support_squares).is_empty()
}

pub fn detect_files_and_outposts(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    for color in [Color::White, Color::Black] {
        let our_pawns = board.by_piece(Piece { role: Role::Pawn, color });
        let their_pawns = board.by_piece(Piece {
            role: Role::Pawn,
            color: !color,
        });
        let rooks = board.by_piece(Piece { role: Role::Rook, color });

        for file in File::ALL {
            let file_bb = Bitboard::from_file(file);
            if (our_pawns & file_bb).is_empty() && !(rooks & file_bb).is_empty() {
                let id = if (their_pawns & file_bb).is_empty() {
                    "open_file"
                } else {
                    "semi_open_file"
                };
                out.push(theme(
                    id,
                    ThemeCategory::Positional,
                    color,
                    (rooks & file_bb).into_iter().collect(),
                    format!("rook on the {:?} {:?} file", file, if id == "open_file" { "open" } else { "semi-open" }),
                    3,
                ));
            }
        }

        // Outposts: a minor piece on a square no enemy pawn can ever attack,
        // supported by a friendly pawn, 5th rank or deeper.
        let minors = board.by_piece(Piece { role: Role::Knight, color }) | board.by_piece(Piece { role: Role::Bishop, color });
        for sq in minors {
            let rank_idx = if color == Color::White { sq.rank() as u32 } else { 7 - sq.rank() as u32 };
            if rank_idx < 4 {
                continue;
            }
            if !(attacks::pawn_attacks(color, sq) & their_pawns).is_empty() {
                continue;
            }
            let guarded_by_own_pawn = !(attacks::pawn_attacks(!color, sq) & our_pawns).is_empty();
            let can_ever_be_attacked = can_enemy_pawn_ever_attack(sq, color, their_pawns);
            if guarded_by_own_pawn && !can_ever_be_attacked {
                out.push(theme(
                    "outpost",
                    ThemeCategory::Positional,
                    color,
                    vec![sq],
                    format!("outpost on {sq}"),
                    4,
                ));
            }
        }
    }
    out
}

fn can_enemy_pawn_ever_attack(sq: Square, color: Color, their_pawns: Bitboard) -> bool {
    let adjacent = adjacent_files(sq.file());
    let behind = match color {
        Color::White => forward_ranks(Color::Black, sq.rank()),
        Color::Black => forward_ranks(Color::White, sq.rank()),
    };
    !(their_pawns & adjacent & behind).is_empty()
}

pub fn detect_space_and_development(position: &Position) -> Vec<DetectedTheme> {
    let mut out = Vec::new();
    let board = position.board();

    let mut space = [0i32; 2];
    for (i, color) in [Color::White, Color::Black].into_iter().enumerate() {
        let our_pawns = board.by_piece(Piece { role: Role::Pawn, color });
        let mut attacked = Bitboard::EMPTY;
        for sq in our_pawns {
            attacked |= attacks::pawn_attacks(color, sq);
        }
        let opponent_side = match color {
            Color::White => {
                Bitboard::from_rank(Rank::Fifth)
                    | Bitboard::from_rank(Rank::Sixth)
                    | Bitboard::from_rank(Rank::Seventh)
                    | Bitboard::from_rank(Rank::Eighth)
            }
            Color::Black => {
                Bitboard::from_rank(Rank::First)
                    | Bitboard::from_rank(Rank::Second)
                    | Bitboard::from_rank(Rank::Third)
                    | Bitboard::from_rank(Rank::Fourth)
            }
        };
        space[i] = (attacked & opponent_side).count() as i32;
    }
    if (space[0] - space[1]).abs() >= 6 {
        let beneficiary = if space[0] > space[1] { Color::White } else { Color::Black };
        out.push(theme(
            "space_advantage",
            ThemeCategory::Positional,
            beneficiary,
            vec![],
            "significant space advantage".to_string(),
            3,
        ));
    }

    // Development lead: count of non-home-square minor pieces, queens moved
    // only once this is approximated by comparing developed-minor counts.
    let mut developed = [0i32; 2];
    for (i, color) in [Color::White, Color::Black].into_iter().enumerate() {
        let (knight_starts, bishop_starts) = if color == Color::White {
            (
                Bitboard::from_square(Square::B1) | Bitboard::from_square(Square::G1),
                Bitboard::from_square(Square::C1) | Bitboard::from_square(Square::F1),
            )
        } else {
            (
                Bitboard::from_square(Square::B8) | Bitboard::from_square(Square::G8),
                Bitboard::from_square(Square::C8) | Bitboard::from_square(Square::F8),
            )
        };
        let knights = board.by_piece(Piece { role: Role::Knight, color });
        let bishops = board.by_piece(Piece { role: Role::Bishop, color });
        developed[i] = ((knights & !knight_starts).count() + (bishops & !bishop_starts).count()) as i32;
    }
    if (developed[0] - developed[1]).abs() >= 2 {
        let beneficiary = if developed[0] > developed[1] { Color::White } else { Color::Black };
        out.push(theme(
            "development_lead",
            ThemeCategory::Positional,
            beneficiary,
            vec![],
            "development lead".to_string(),
            2,
        ));
    }

    out
}
