//! Hand-crafted evaluation: per-factor, phase-interpolated scoring used to
//! explain *why* the engine likes a position, independent of the engine's
//! own (opaque) search score.
//!
//! Grounded on the teacher's `game::evaluation::*` per-term functions
//! (`mobility`, `king_safety`, `pawn_structure`, `rooks`, `bishops`,
//! `knights`, `space`), generalized from scalar bonuses tied to a search
//! config into standalone `HceFactor { mg, eg }` pairs. The teacher's own
//! per-term signatures are kept; the `SearchConfig`-weighted blending in
//! `game::evaluation::mod.rs` (and its pawn_structure/king_safety call-site
//! arity bug) is not carried over.

use shakmaty::{Bitboard, Board, Color, File, Piece, Position as _, Rank, Role, Square};

use crate::artifact::{Hce, HceFactor};
use crate::constants::*;
use crate::position::Position;

/// Computes the full per-factor breakdown for the side to move.
pub fn compute(position: &Position) -> Hce {
    let board = position.board();
    let phase = game_phase(board);

    let material = factor_both(board, material_cp);
    let imbalance = factor_both(board, imbalance_cp);
    let pawns = factor_both(board, pawns_cp);
    let knights = factor_both(board, knights_cp);
    let bishops = factor_both(board, bishops_cp);
    let rooks = factor_both(board, rooks_cp);
    let queens = factor_both(board, queens_cp);
    let mobility = factor_both(board, mobility_cp);
    let king_safety = factor_both(board, king_safety_cp);
    let threats = factor_both(board, threats_cp);
    let passed = factor_both(board, passed_pawns_cp);
    let space = factor_both(board, space_cp);
    let winnable = winnable_factor(board);

    let total = material.interpolated(phase, TOTAL_PHASE_256)
        + imbalance.interpolated(phase, TOTAL_PHASE_256)
        + pawns.interpolated(phase, TOTAL_PHASE_256)
        + knights.interpolated(phase, TOTAL_PHASE_256)
        + bishops.interpolated(phase, TOTAL_PHASE_256)
        + rooks.interpolated(phase, TOTAL_PHASE_256)
        + queens.interpolated(phase, TOTAL_PHASE_256)
        + mobility.interpolated(phase, TOTAL_PHASE_256)
        + king_safety.interpolated(phase, TOTAL_PHASE_256)
        + threats.interpolated(phase, TOTAL_PHASE_256)
        + passed.interpolated(phase, TOTAL_PHASE_256)
        + space.interpolated(phase, TOTAL_PHASE_256)
        + winnable.interpolated(phase, TOTAL_PHASE_256);

    let stm_relative = if position.chess().turn() == Color::White {
        total
    } else {
        -total
    };

    Hce {
        material,
        imbalance,
        pawns,
        knights,
        bishops,
        rooks,
        queens,
        mobility,
        king_safety,
        threats,
        passed,
        space,
        winnable,
        game_phase: phase,
        final_eval_cp: stm_relative,
    }
}

/// Tapered-phase scale used by `HceFactor::interpolated`, 0 (endgame) to 256
/// (opening); distinct from `constants::TOTAL_PHASE`, which counts pieces.
const TOTAL_PHASE_256: i32 = 256;

fn game_phase(board: &Board) -> i32 {
    let mut value = 0;
    for &role in &[Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
        let count = board.by_role(role).count() as i32;
        value += count
            * match role {
                Role::Queen => QUEEN_PHASE_VAL,
                Role::Rook => ROOK_PHASE_VAL,
                Role::Bishop => BISHOP_PHASE_VAL,
                Role::Knight => KNIGHT_PHASE_VAL,
                _ => 0,
            };
    }
    let value = value.min(TOTAL_PHASE);
    (value * TOTAL_PHASE_256 + TOTAL_PHASE / 2) / TOTAL_PHASE
}

/// Runs a white-minus-black scalar term for both colors and packs the
/// result as a non-tapered `HceFactor` (mg == eg); only material and
/// winnable are genuinely phase-dependent in this model.
fn factor_both(board: &Board, f: impl Fn(&Board, Color) -> i32) -> HceFactor {
    let score = f(board, Color::White) - f(board, Color::Black);
    HceFactor { mg: score, eg: score }
}

fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => 0,
    }
}

fn material_cp(board: &Board, color: Color) -> i32 {
    Role::ALL.iter().map(|&role| board.by_piece(Piece { role, color }).count() as i32 * piece_value(role)).sum()
}

/// Bishop-pair bonus; the only imbalance term this model carries.
fn imbalance_cp(board: &Board, color: Color) -> i32 {
    if board.by_piece(Piece { role: Role::Bishop, color }).count() >= 2 {
        BISHOP_PAIR_BONUS
    } else {
        0
    }
}

fn pawns_cp(board: &Board, color: Color) -> i32 {
    let ours = board.by_piece(Piece { role: Role::Pawn, color });
    let mut score = 0;
    for file in File::ALL {
        let on_file = (ours & Bitboard::from_file(file)).count() as i32;
        if on_file > 1 {
            score -= (on_file - 1) * DOUBLED_PAWN_PENALTY;
        }
    }
    for pawn_sq in ours {
        if is_isolated(ours, pawn_sq.file()) {
            score -= ISOLATED_PAWN_PENALTY;
        }
        if is_chained(ours, pawn_sq, color) {
            score += PAWN_CHAIN_BONUS;
        }
    }
    score
}

fn is_isolated(ours: Bitboard, file: File) -> bool {
    let neighbors = adjacent_files(file);
    (ours & neighbors).is_empty()
}

fn adjacent_files(file: File) -> Bitboard {
    let idx = file as i32;
    let mut bb = Bitboard::EMPTY;
    if idx > 0 {
        bb |= Bitboard::from_file(File::new((idx - 1) as u32));
    }
    if idx < 7 {
        bb |= Bitboard::from_file(File::new((idx + 1) as u32));
    }
    bb
}

fn rank_behind(rank: Rank, color: Color) -> Option<Rank> {
    let idx = rank as i32;
    let behind = match color {
        Color::White => idx - 1,
        Color::Black => idx + 1,
    };
    (0..=7).contains(&behind).then(|| Rank::new(behind as u32))
}

fn is_chained(ours: Bitboard, pawn_sq: Square, color: Color) -> bool {
    let Some(behind_rank) = rank_behind(pawn_sq.rank(), color) else {
        return false;
    };
    let supporters = adjacent_files(pawn_sq.file()) & Bitboard::from_rank(behind_rank);
    !(ours & supporters).is_empty()
}

fn passed_pawns_cp(board: &Board, color: Color) -> i32 {
    let ours = board.by_piece(Piece { role: Role::Pawn, color });
    let theirs = board.by_piece(Piece { role: Role::Pawn, color: !color });
    let mut score = 0;
    for pawn_sq in ours {
        if is_passed(pawn_sq, color, theirs) {
            let rank = pawn_sq.rank() as usize;
            let idx = if color == Color::White { rank } else { 7 - rank };
            score += PASSED_PAWN_RANK_BONUS[idx];
        } else if is_candidate_passed(ours, theirs, pawn_sq, color) {
            score += CANDIDATE_PASSED_PAWN_BONUS;
        }
    }
    score
}

fn is_passed(pawn_sq: Square, color: Color, enemy_pawns: Bitboard) -> bool {
    let mut front = Bitboard::EMPTY;
    let files = Bitboard::from_file(pawn_sq.file()) | adjacent_files(pawn_sq.file());
    for sq in files {
        let ahead = match color {
            Color::White => sq.rank() as i32 > pawn_sq.rank() as i32,
            Color::Black => (sq.rank() as i32) < pawn_sq.rank() as i32,
        };
        if ahead {
            front.add(sq);
        }
    }
    (enemy_pawns & front).is_empty()
}

fn is_candidate_passed(ours: Bitboard, enemy_pawns: Bitboard, pawn_sq: Square, color: Color) -> bool {
    // Same as a passed pawn but allows one opposing pawn directly ahead,
    // provided it is outnumbered by friendly pawns able to trade it off.
    let ahead_on_file = match color {
        Color::White => (enemy_pawns & Bitboard::from_file(pawn_sq.file())).into_iter().any(|sq| sq.rank() as i32 > pawn_sq.rank() as i32),
        Color::Black => (enemy_pawns & Bitboard::from_file(pawn_sq.file())).into_iter().any(|sq| (sq.rank() as i32) < pawn_sq.rank() as i32),
    };
    ahead_on_file && !is_isolated(ours, pawn_sq.file())
}

fn mobility_cp(board: &Board, color: Color) -> i32 {
    let occupied = board.occupied();
    let friendly = board.by_color(color);
    let mut score = 0;
    for role in [Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
        let bonus = match role {
            Role::Knight => KNIGHT_MOBILITY_BONUS,
            Role::Bishop => BISHOP_MOBILITY_BONUS,
            Role::Rook => ROOK_MOBILITY_BONUS,
            Role::Queen => QUEEN_MOBILITY_BONUS,
            _ => 0,
        };
        for sq in board.by_piece(Piece { role, color }) {
            let reach = shakmaty::attacks::attacks(sq, Piece { role, color }, occupied) & !friendly;
            score += reach.count() as i32 * bonus;
        }
    }
    score
}

fn knights_cp(board: &Board, color: Color) -> i32 {
    let enemy_pawns = board.by_piece(Piece { role: Role::Pawn, color: !color });
    let mut score = 0;
    for sq in board.by_piece(Piece { role: Role::Knight, color }) {
        if is_outpost(sq, color, enemy_pawns) {
            score += OUTPOST_BONUS;
        }
    }
    score
}

fn is_outpost(sq: Square, color: Color, enemy_pawns: Bitboard) -> bool {
    let rank_ok = match color {
        Color::White => matches!(sq.rank(), Rank::Fourth | Rank::Fifth | Rank::Sixth),
        Color::Black => matches!(sq.rank(), Rank::Fifth | Rank::Fourth | Rank::Third),
    };
    if !rank_ok {
        return false;
    }
    let attacking_files = adjacent_files(sq.file());
    let mut attacking = Bitboard::EMPTY;
    for asq in enemy_pawns & attacking_files {
        let ahead = match color {
            Color::White => asq.rank() as i32 > sq.rank() as i32,
            Color::Black => (asq.rank() as i32) < sq.rank() as i32,
        };
        if ahead {
            attacking.add(asq);
        }
    }
    attacking.is_empty()
}

fn bishops_cp(board: &Board, color: Color) -> i32 {
    let own_pawns = board.by_piece(Piece { role: Role::Pawn, color });
    let central = Bitboard::from(Square::C3)
        | Bitboard::from(Square::D3)
        | Bitboard::from(Square::E3)
        | Bitboard::from(Square::F3)
        | Bitboard::from(Square::C4)
        | Bitboard::from(Square::D4)
        | Bitboard::from(Square::E4)
        | Bitboard::from(Square::F4)
        | Bitboard::from(Square::C5)
        | Bitboard::from(Square::D5)
        | Bitboard::from(Square::E5)
        | Bitboard::from(Square::F5)
        | Bitboard::from(Square::C6)
        | Bitboard::from(Square::D6)
        | Bitboard::from(Square::E6)
        | Bitboard::from(Square::F6);
    let mut score = 0;
    for bishop_sq in board.by_piece(Piece { role: Role::Bishop, color }) {
        let same_color_squares = if is_light_square(bishop_sq) { light_squares() } else { !light_squares() };
        let blocked_by_own = (own_pawns & central & same_color_squares).count() as i32;
        if blocked_by_own >= 3 {
            score -= BAD_BISHOP_PENALTY;
        }
    }
    score
}

fn is_light_square(sq: Square) -> bool {
    (sq.file() as u32 + sq.rank() as u32) % 2 == 1
}

fn light_squares() -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for sq in Square::ALL {
        if is_light_square(sq) {
            bb.add(sq);
        }
    }
    bb
}

fn rooks_cp(board: &Board, color: Color) -> i32 {
    let own_pawns = board.by_piece(Piece { role: Role::Pawn, color });
    let enemy_pawns = board.by_piece(Piece { role: Role::Pawn, color: !color });
    let seventh = match color {
        Color::White => Rank::Seventh,
        Color::Black => Rank::Second,
    };
    let mut score = 0;
    for rook_sq in board.by_piece(Piece { role: Role::Rook, color }) {
        let file_bb = Bitboard::from_file(rook_sq.file());
        let own_on_file = (own_pawns & file_bb).count();
        let enemy_on_file = (enemy_pawns & file_bb).count();
        if own_on_file == 0 && enemy_on_file == 0 {
            score += OPEN_FILE_BONUS;
        } else if own_on_file == 0 {
            score += SEMI_OPEN_FILE_BONUS;
        }
        if rook_sq.rank() == seventh {
            score += SEVENTH_RANK_BONUS;
        }
    }
    score
}

fn queens_cp(board: &Board, color: Color) -> i32 {
    // Early queen development is penalized elsewhere (`development`);
    // queen placement itself folds into material + mobility, so this term
    // is reserved for future safety/outpost refinements.
    let _ = (board, color);
    0
}

fn king_zone_files(file: File) -> Vec<File> {
    let idx = file as i32;
    let mut files = vec![file];
    if idx > 0 {
        files.push(File::new((idx - 1) as u32));
    }
    if idx < 7 {
        files.push(File::new((idx + 1) as u32));
    }
    files
}

fn king_safety_cp(board: &Board, color: Color) -> i32 {
    let Some(king_sq) = board.king_of(color) else {
        return 0;
    };
    let own_pawns = board.by_piece(Piece { role: Role::Pawn, color });
    let shield_rank = rank_behind(king_sq.rank(), !color);
    let mut score = 0;
    if let Some(shield_rank) = shield_rank {
        let shield_files = Bitboard::from_file(king_sq.file()) | adjacent_files(king_sq.file());
        let shield_squares = shield_files & Bitboard::from_rank(shield_rank);
        score += (own_pawns & shield_squares).count() as i32 * PAWN_SHIELD_BONUS_PER_PAWN;
    }
    let enemy_pawns = board.by_piece(Piece { role: Role::Pawn, color: !color });
    for file in king_zone_files(king_sq.file()) {
        let file_bb = Bitboard::from_file(file);
        let own_on_file = (own_pawns & file_bb).count();
        let enemy_on_file = (enemy_pawns & file_bb).count();
        if own_on_file == 0 && enemy_on_file == 0 {
            score -= OPEN_FILE_PENALTY;
        } else if own_on_file == 0 {
            score -= SEMI_OPEN_FILE_PENALTY;
        }
    }
    score
}

fn threats_cp(board: &Board, color: Color) -> i32 {
    let occupied = board.occupied();
    let mut our_attacks = Bitboard::EMPTY;
    for sq in board.by_color(color) {
        if let Some(piece) = board.piece_at(sq) {
            our_attacks |= shakmaty::attacks::attacks(sq, piece, occupied);
        }
    }
    let mut their_defenses = Bitboard::EMPTY;
    for sq in board.by_color(!color) {
        if let Some(piece) = board.piece_at(sq) {
            their_defenses |= shakmaty::attacks::attacks(sq, piece, occupied);
        }
    }
    let mut score = 0;
    for role in Role::ALL {
        for sq in board.by_piece(Piece { role, color: !color }) {
            if our_attacks.contains(sq) && !their_defenses.contains(sq) {
                score += piece_value(role) / UNDEFENDED_THREAT_DIVISOR;
            }
        }
    }
    score
}

fn space_cp(board: &Board, color: Color) -> i32 {
    let own_pawns = board.by_piece(Piece { role: Role::Pawn, color });
    let mut attacked = Bitboard::EMPTY;
    for sq in own_pawns {
        attacked |= shakmaty::attacks::pawn_attacks(color, sq);
    }
    let opponent_side = match color {
        Color::White => Bitboard::from_rank(Rank::Fifth) | Bitboard::from_rank(Rank::Sixth) | Bitboard::from_rank(Rank::Seventh) | Bitboard::from_rank(Rank::Eighth),
        Color::Black => Bitboard::from_rank(Rank::First) | Bitboard::from_rank(Rank::Second) | Bitboard::from_rank(Rank::Third) | Bitboard::from_rank(Rank::Fourth),
    };
    let controlled = attacked & opponent_side;
    let mut score = controlled.count() as i32 * SPACE_PER_SQUARE_BONUS;
    let center = Bitboard::from(Square::D4) | Bitboard::from(Square::E4) | Bitboard::from(Square::D5) | Bitboard::from(Square::E5);
    if !(controlled & center).is_empty() {
        score += CENTER_CONTROL_BONUS;
    }
    score
}

/// How "winnable" the position structurally is, independent of phase: a
/// bare-king-and-pieces ending with no pawns left for either side is
/// notoriously drawish regardless of material count, more so in the
/// endgame term than the middlegame one.
fn winnable_factor(board: &Board) -> HceFactor {
    let pawns = board.by_role(Role::Pawn).count() as i32;
    let mg = if pawns == 0 { -WINNABLE_NO_PAWNS_PENALTY } else { 0 };
    let eg = if pawns == 0 { -WINNABLE_NO_PAWNS_PENALTY * 2 } else { 0 };
    HceFactor { mg, eg }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_is_symmetric_at_the_start() {
        let position = Position::new_initial();
        let hce = compute(&position);
        assert_eq!(hce.material.mg, 0);
        assert_eq!(hce.final_eval_cp, 0);
    }

    #[test]
    fn an_extra_queen_dominates_material() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2Q w - - 0 1").unwrap();
        let hce = compute(&position);
        assert!(hce.material.mg >= QUEEN_VALUE);
        assert!(hce.final_eval_cp > 0);
    }

    #[test]
    fn open_file_rook_scores_above_a_blocked_one() {
        let open = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let blocked = Position::from_fen("4k3/8/8/8/8/8/P7/R3K3 w - - 0 1").unwrap();
        let open_score = rooks_cp(open.board(), Color::White);
        let blocked_score = rooks_cp(blocked.board(), Color::White);
        assert!(open_score > blocked_score);
    }

    #[test]
    fn bare_king_ending_is_penalized_as_less_winnable() {
        let with_pawns = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        let without_pawns = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let w1 = winnable_factor(with_pawns.board());
        let w2 = winnable_factor(without_pawns.board());
        assert!(w1.eg > w2.eg);
    }
}
