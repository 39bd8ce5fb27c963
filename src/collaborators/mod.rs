//! External collaborators the orchestrator consults: an engine for
//! multi-PV evaluation, a human-move predictor, an opening book, a
//! reference-games database, and an LLM for prose. Each is a trait so the
//! orchestrator can run against deterministic local mocks without a real
//! engine or network access.

pub mod circuit_breaker;

use async_trait::async_trait;
use shakmaty::{Color, Piece, Position, Role};

use crate::artifact::{EngineEval, PvLine};
use crate::constants::*;
use crate::error::{AnnotatorError, Result};
use crate::position::Position as BoardPosition;

#[async_trait]
pub trait EngineClient: Send + Sync {
    async fn evaluate_multi_pv(&self, position: &BoardPosition, depth: u32, multipv: u32) -> Result<EngineEval>;
}

#[async_trait]
pub trait HumanMoveModel: Send + Sync {
    /// Returns the uci moves a player near `rating` would plausibly consider,
    /// most likely first.
    async fn predict(&self, position: &BoardPosition, rating: u32) -> Result<Vec<String>>;
}

#[async_trait]
pub trait OpeningDb: Send + Sync {
    /// Returns `Some(name)` if `position` is a known book position.
    async fn lookup(&self, position: &BoardPosition) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct ReferenceGame {
    pub white: String,
    pub black: String,
    pub result: String,
    pub continuation_uci: Vec<String>,
}

#[async_trait]
pub trait ReferenceGamesDb: Send + Sync {
    async fn get_reference_games(&self, position: &BoardPosition, limit: usize) -> Result<Vec<ReferenceGame>>;
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Material + tapered piece-square evaluation from the side to move's
/// perspective, in centipawns. Shared by the mock engine and the human-move
/// heuristic so both rank moves consistently.
pub fn heuristic_eval(position: &BoardPosition) -> i32 {
    let board = position.board();
    let phase = game_phase(board);
    let mut white_score = 0i32;
    let mut black_score = 0i32;

    for &role in &Role::ALL {
        let value = piece_value(role);
        for &color in &Color::ALL {
            let count = board.by_piece(Piece { role, color }).count() as i32;
            if color == Color::White {
                white_score += count * value;
            } else {
                black_score += count * value;
            }
        }
    }

    let mobility_white = position.chess().clone().legal_moves().len() as i32;
    let total = white_score - black_score;
    let tapered_mobility = (mobility_white * phase) / TOTAL_PHASE.max(1);

    let total = if position.turn() == Color::White {
        total + tapered_mobility
    } else {
        total - tapered_mobility
    };

    if position.turn() == Color::White {
        total
    } else {
        -total
    }
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

fn game_phase(board: &shakmaty::Board) -> i32 {
    let mut phase = 0;
    for &role in &[Role::Knight, Role::Bishop, Role::Rook, Role::Queen] {
        let count = board.by_role(role).count() as i32;
        phase += count
            * match role {
                Role::Queen => QUEEN_PHASE_VAL,
                Role::Rook => ROOK_PHASE_VAL,
                Role::Bishop => BISHOP_PHASE_VAL,
                Role::Knight => KNIGHT_PHASE_VAL,
                _ => 0,
            };
    }
    phase.min(TOTAL_PHASE)
}

/// Deterministic engine mock: ranks legal moves by one-ply `heuristic_eval`
/// lookahead and reports the top `multipv` as principal variations.
pub struct MockEngine;

#[async_trait]
impl EngineClient for MockEngine {
    async fn evaluate_multi_pv(&self, position: &BoardPosition, depth: u32, multipv: u32) -> Result<EngineEval> {
        let legal = position.legal_moves();
        if legal.is_empty() {
            return Ok(EngineEval {
                lines: vec![PvLine {
                    eval_cp: if position.is_checkmate() { -MATE_SCORE } else { 0 },
                    moves_uci: vec![],
                    depth,
                }],
                depth,
                multipv: 1,
            });
        }

        let mut scored: Vec<(String, i32)> = legal
            .iter()
            .map(|mv| {
                let uci = shakmaty::uci::UciMove::from_standard(*mv).to_string();
                let mut next = position.chess().clone();
                shakmaty::Position::play_unchecked(&mut next, *mv);
                let next_position = BoardPosition::from_chess(next);
                (uci, -heuristic_eval(&next_position))
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let lines = scored
            .into_iter()
            .take(multipv.max(1) as usize)
            .map(|(uci, eval_cp)| PvLine {
                eval_cp,
                moves_uci: vec![uci],
                depth,
            })
            .collect();

        Ok(EngineEval {
            lines,
            depth,
            multipv,
        })
    }
}

/// Deterministic human-move mock: a player near `rating` is modeled as
/// preferring the engine's top moves, with lower ratings tolerating a wider
/// spread of candidates.
pub struct MockHumanMoveModel {
    pub engine: MockEngine,
}

#[async_trait]
impl HumanMoveModel for MockHumanMoveModel {
    async fn predict(&self, position: &BoardPosition, rating: u32) -> Result<Vec<String>> {
        let spread = if rating >= 2000 {
            2
        } else if rating >= 1400 {
            4
        } else {
            6
        };
        let eval = self.engine.evaluate_multi_pv(position, 10, spread).await?;
        Ok(eval.lines.into_iter().map(|l| l.moves_uci.into_iter().next().unwrap_or_default()).collect())
    }
}

/// Empty opening book: every position is reported as out of book. Real
/// deployments plug in a polyglot or PGN-derived book here.
pub struct EmptyOpeningDb;

#[async_trait]
impl OpeningDb for EmptyOpeningDb {
    async fn lookup(&self, _position: &BoardPosition) -> Result<Option<String>> {
        Ok(None)
    }
}

pub struct EmptyReferenceGamesDb;

#[async_trait]
impl ReferenceGamesDb for EmptyReferenceGamesDb {
    async fn get_reference_games(&self, _position: &BoardPosition, _limit: usize) -> Result<Vec<ReferenceGame>> {
        Ok(vec![])
    }
}

/// LLM client that always reports unavailable, used when `--skip-llm` is
/// set or no API key is configured; the narrator falls back to templates.
pub struct NullLlmClient;

#[async_trait]
impl LlmClient for NullLlmClient {
    async fn chat(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String> {
        Err(AnnotatorError::LlmUnavailable("no LLM client configured".to_string()))
    }
}

/// Wraps an `LlmClient` with the process-wide circuit breaker: skips the
/// call entirely while open, and records success/failure on every attempt.
pub struct GuardedLlmClient<C: LlmClient> {
    inner: C,
}

impl<C: LlmClient> GuardedLlmClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for GuardedLlmClient<C> {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let breaker = circuit_breaker::llm_circuit();
        if !breaker.allow_request() {
            return Err(AnnotatorError::LlmCircuitOpen {
                retry_after: breaker.retry_after(),
            });
        }
        match self.inner.chat(system_prompt, user_prompt).await {
            Ok(text) => {
                breaker.record_success();
                Ok(text)
            }
            Err(err) => {
                breaker.record_failure();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_engine_reports_requested_multipv_lines() {
        let engine = MockEngine;
        let position = BoardPosition::new_initial();
        let eval = engine.evaluate_multi_pv(&position, 8, 3).await.unwrap();
        assert_eq!(eval.lines.len(), 3);
    }

    #[tokio::test]
    async fn higher_rating_narrows_candidate_spread() {
        let model = MockHumanMoveModel { engine: MockEngine };
        let position = BoardPosition::new_initial();
        let strong = model.predict(&position, 2200).await.unwrap();
        let weak = model.predict(&position, 800).await.unwrap();
        assert!(strong.len() < weak.len());
    }

    #[tokio::test]
    async fn guarded_client_short_circuits_when_open() {
        struct AlwaysFails;
        #[async_trait]
        impl LlmClient for AlwaysFails {
            async fn chat(&self, _s: &str, _u: &str) -> Result<String> {
                Err(AnnotatorError::LlmUnavailable("down".to_string()))
            }
        }
        let guarded = GuardedLlmClient::new(AlwaysFails);
        for _ in 0..CIRCUIT_FAILURE_THRESHOLD {
            let _ = guarded.chat("sys", "user").await;
        }
        let result = guarded.chat("sys", "user").await;
        assert!(matches!(result, Err(AnnotatorError::LlmCircuitOpen { .. })));
    }
}
