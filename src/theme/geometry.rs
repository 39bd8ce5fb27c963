//! Ray-casting helpers shared by the tactical theme detectors, built
//! directly on `shakmaty::attacks` the same way the teacher's
//! `opponent_weakness.rs` uses `attacks::between`.

use shakmaty::{attacks, Bitboard, Board, Color, Piece, Role, Square};

/// Returns the single piece strictly between `from` and `to` on a shared
/// rank/file/diagonal, or `None` if the squares aren't aligned or there are
/// zero/multiple pieces between them.
pub fn piece_between(board: &Board, from: Square, to: Square) -> Option<Square> {
    let between = attacks::between(from, to) & board.occupied();
    if between.count() == 1 {
        between.into_iter().next()
    } else {
        None
    }
}

/// Whether `from` and `to` lie on a common rank, file, or diagonal.
pub fn aligned(from: Square, to: Square) -> bool {
    !attacks::between(from, to).is_empty() || is_adjacent_on_line(from, to)
}

fn is_adjacent_on_line(a: Square, b: Square) -> bool {
    let (af, ar) = (a.file() as i32, a.rank() as i32);
    let (bf, br) = (b.file() as i32, b.rank() as i32);
    af == bf || ar == br || (af - bf).abs() == (ar - br).abs()
}

/// All squares attacked by `color`'s sliding pieces of `role` from `from`,
/// given the board's occupancy.
pub fn sliding_attacks(role: Role, from: Square, occupied: Bitboard) -> Bitboard {
    match role {
        Role::Bishop => attacks::bishop_attacks(from, occupied),
        Role::Rook => attacks::rook_attacks(from, occupied),
        Role::Queen => attacks::queen_attacks(from, occupied),
        _ => Bitboard::EMPTY,
    }
}

/// All squares `color` attacks on `board`, piece-type aware.
pub fn all_attacks(board: &Board, color: Color) -> Bitboard {
    let occupied = board.occupied();
    let mut result = Bitboard::EMPTY;
    for sq in board.by_color(color) {
        if let Some(piece) = board.piece_at(sq) {
            result |= attacks::attacks(sq, piece, occupied);
        }
    }
    result
}

/// Squares of `color` attacking `square`.
pub fn attackers_of(board: &Board, square: Square, color: Color) -> Bitboard {
    let occupied = board.occupied();
    let mut result = Bitboard::EMPTY;
    for sq in board.by_color(color) {
        if let Some(piece) = board.piece_at(sq) {
            if attacks::attacks(sq, piece, occupied).contains(square) {
                result.add(sq);
            }
        }
    }
    result
}

pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => crate::constants::PAWN_VALUE,
        Role::Knight => crate::constants::KNIGHT_VALUE,
        Role::Bishop => crate::constants::BISHOP_VALUE,
        Role::Rook => crate::constants::ROOK_VALUE,
        Role::Queen => crate::constants::QUEEN_VALUE,
        Role::King => 0,
    }
}

pub fn is_slider(role: Role) -> bool {
    matches!(role, Role::Bishop | Role::Rook | Role::Queen)
}

pub fn piece_on(board: &Board, square: Square) -> Option<Piece> {
    board.piece_at(square)
}
