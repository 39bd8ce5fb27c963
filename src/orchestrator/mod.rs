//! Orchestrator: the parse -> analyze -> explore -> annotate -> render
//! pipeline that ties every collaborator and pure module together into one
//! `annotate_pgn` entry point.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::artifact::{ArtifactStore, CandidateMove, CandidateSource, Classification, EngineEval, MoveAssessment, StoreStats};
use crate::classify::{classify, ClassifyInput};
use crate::collaborators::{EngineClient, HumanMoveModel, LlmClient, OpeningDb};
use crate::config::AnnotatorConfig;
use crate::constants::*;
use crate::criticality::criticality;
use crate::dag::VariationDag;
use crate::error::Result;
use crate::explore::{ExplorationBudget, ExplorationCandidate, ExplorationEngine};
use crate::hce;
use crate::idea_tracker::IdeaTracker;
use crate::intent::planner::{Planner, PlannerDecision};
use crate::intent::{score_intent, CommentIntent, IntentInput, IntentType};
use crate::line_memory::LineMemory;
use crate::narrator::{narrate, NarratorInput};
use crate::pgn::{self, AnnotatedMove, Game};
use crate::position::Position;
use crate::theme;

/// Everything the orchestrator needs to talk to the outside world. Tests
/// and the CLI both build one of these, wiring in mocks or real clients.
pub struct Collaborators {
    pub engine: Box<dyn EngineClient>,
    pub human_model: Box<dyn HumanMoveModel>,
    pub opening_db: Box<dyn OpeningDb>,
    pub llm: Box<dyn LlmClient>,
}

pub struct AnnotationReport {
    pub rendered_pgn: String,
    pub dag_stats: crate::dag::DagStats,
    pub store_stats: StoreStats,
    pub comments_emitted: usize,
}

/// Skips the exploration/annotation-worthiness heuristic for clearly decided,
/// non-thematic positions: a decisive eval with a book/excellent/good move
/// and no significant theme is not worth spending engine time on.
fn exploration_worthy(eval_cp: i32, classification: Classification, has_significant_theme: bool) -> bool {
    if eval_cp.unsigned_abs() as i32 >= 300
        && matches!(classification, Classification::Excellent | Classification::Good | Classification::Book)
        && !has_significant_theme
    {
        return false;
    }
    true
}

/// Scales exploration node/time budget down for low-criticality plies so the
/// engine spends its budget where it matters.
fn budget_multiplier(criticality_score: f64) -> f64 {
    (0.25 + 0.75 * (criticality_score / 100.0)).clamp(0.25, 1.0)
}

pub async fn annotate_pgn(pgn_text: &str, config: &AnnotatorConfig, collaborators: &Collaborators) -> Result<AnnotationReport> {
    let games = pgn::parse(pgn_text)?;
    let game = games.into_iter().next().expect("parse guarantees at least one game");
    annotate_game(&game, config, collaborators).await
}

async fn annotate_game(game: &Game, config: &AnnotatorConfig, collaborators: &Collaborators) -> Result<AnnotationReport> {
    let root = Position::new_initial();
    let mut dag = VariationDag::new(root.key(), root.fen());
    let mut store = ArtifactStore::new();
    let mut idea_tracker = IdeaTracker::new();
    let mut line_memory = LineMemory::new();
    let mut planner = Planner::new(config.density);
    let stop_flag = Arc::new(AtomicBool::new(false));

    let mut position = root;
    let mut cursor = dag.root();
    let mut annotated_moves = Vec::with_capacity(game.moves.len());
    let mut comments_emitted = 0usize;
    let mut line_scope = idea_tracker.start_line();

    for (ply, (san, uci)) in game.moves.iter().zip(game.moves_uci.iter()).enumerate() {
        let ply = ply as u32;
        let eval_before = eval_for(&position, Tier::Shallow, &mut store, collaborators.engine.as_ref()).await?;
        let eval_before_cp = eval_before.best_cp().unwrap_or(0);

        let next_position = position.play_uci(uci)?;
        let (edge_id, _merged) = dag.add_move(cursor, uci, san, next_position.key(), next_position.fen())?;
        cursor = dag.edge(edge_id).to;

        let is_book = collaborators.opening_db.lookup(&position).await?.is_some();
        let eval_after = eval_for(&next_position, Tier::Shallow, &mut store, collaborators.engine.as_ref()).await?;
        let eval_after_cp = eval_after.best_cp().unwrap_or(0);

        let crit = criticality(eval_before_cp, eval_after_cp);
        let recommended_tier = crit.recommended_tier;
        if recommended_tier > Tier::Shallow {
            let _ = eval_for(&next_position, recommended_tier, &mut store, collaborators.engine.as_ref()).await?;
        }

        let is_forced = position.legal_moves().len() <= 1;
        let classification_input = ClassifyInput {
            eval_before: eval_before_cp,
            eval_after: eval_after_cp,
            is_forced,
            is_book,
            is_only_good_move_and_sacrifices: false,
        };
        let outcome = classify(&classification_input);

        let themes = theme::detect(&next_position, recommended_tier);
        store.put_themes(next_position.key(), themes.clone());
        store.put_hce(next_position.key(), hce::compute(&next_position));
        let has_significant_theme = themes.iter().any(|t| t.severity >= 60);
        let deltas = line_memory.diff_themes(&themes);
        line_memory.push_eval(eval_after_cp);

        let worth_exploring = exploration_worthy(eval_after_cp, outcome.classification.clone(), has_significant_theme);
        let mult = budget_multiplier(crit.score);
        debug!(ply, worth_exploring, multiplier = mult, "exploration worthiness evaluated");

        if worth_exploring {
            let outcome = explore_side_lines(&position, crit.score, mult, config, collaborators, &stop_flag).await?;
            debug!(ply, explored = outcome.explored_order.len(), stop_reason = ?outcome.stop_reason, "side-line exploration finished");
        }

        let assessment = MoveAssessment {
            classification: outcome.classification.clone(),
            nags: outcome.nags.clone(),
            cp_delta: outcome.cp_delta,
            cp_loss: outcome.cp_loss,
            severity: outcome.severity,
        };
        store.put_move_assessment(position.key(), uci.clone(), assessment);

        let idea_id = themes.first().map(|t| t.id.clone());
        let intent_input = IntentInput {
            ply,
            criticality: crit.score,
            theme_novelty: if deltas.iter().any(|d| d.kind == crate::line_memory::ThemeDeltaKind::Emerged) {
                1.0
            } else {
                0.2
            },
            instructional_value: if has_significant_theme { 0.8 } else { 0.3 },
            cp_swing: outcome.cp_delta,
            is_significant_theme: has_significant_theme,
            intent_type: if has_significant_theme {
                IntentType::TacticalTheme
            } else {
                IntentType::MoveQuality
            },
            idea_id: idea_id.clone(),
            summary: summarize(san, &outcome.classification, &themes),
        };

        let redundancy = idea_id
            .as_ref()
            .map(|id| idea_tracker.check_redundancy(&line_scope, id, ply));
        let intent = score_intent(&intent_input, 0.0);
        let decision = planner.decide(&intent, redundancy);

        let comment = match decision {
            PlannerDecision::Include => {
                if let Some(id) = &idea_id {
                    idea_tracker.mark_explained(&mut line_scope, id, &intent.summary, ply);
                }
                comments_emitted += 1;
                Some(render_comment(collaborators, &intent, &position, san, config).await)
            }
            PlannerDecision::BriefReference => {
                comments_emitted += 1;
                Some(intent.summary.clone())
            }
            PlannerDecision::Skip => None,
        };
        planner.advance_ply(comment.is_some());

        annotated_moves.push(AnnotatedMove {
            san: san.clone(),
            nags: outcome.nags,
            comment,
        });

        position = next_position;
    }

    let rendered_pgn = pgn::render(&game.headers, &annotated_moves);
    Ok(AnnotationReport {
        rendered_pgn,
        dag_stats: dag.stats(),
        store_stats: store.stats(),
        comments_emitted,
    })
}

async fn eval_for(
    position: &Position,
    tier: Tier,
    store: &mut ArtifactStore,
    engine: &dyn EngineClient,
) -> Result<EngineEval> {
    let key = position.key();
    if let Some(cached) = store.get_engine_eval(&key, tier) {
        return Ok(cached.clone());
    }
    let defaults = tier_defaults(tier);
    let eval = engine.evaluate_multi_pv(position, defaults.depth, defaults.multipv).await?;
    store.put_engine_eval(key, tier, eval.clone());
    Ok(eval)
}

fn summarize(san: &str, classification: &Classification, themes: &[crate::artifact::DetectedTheme]) -> String {
    match themes.first() {
        Some(theme) => format!("{san} ({classification:?}): {}", theme.description),
        None => format!("{san} is {classification:?}"),
    }
}

async fn render_comment(collaborators: &Collaborators, intent: &CommentIntent, position: &Position, played_san: &str, config: &AnnotatorConfig) -> String {
    let legal_moves_san: Vec<String> = position
        .legal_moves()
        .iter()
        .filter_map(|m| {
            let uci = shakmaty::uci::UciMove::from_standard(*m).to_string();
            position.uci_to_san(&uci).ok()
        })
        .collect();

    let llm_text = if config.skip_llm {
        None
    } else {
        let system_prompt = "You are a chess coach writing one concise annotation comment.";
        let user_prompt = format!("Position after {played_san}. Explain: {}", intent.summary);
        match tokio::time::timeout(Duration::from_secs(10), collaborators.llm.chat(system_prompt, &user_prompt)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(err)) => {
                warn!(error = %err, "llm collaborator failed, falling back to template");
                None
            }
            Err(_) => {
                warn!("llm collaborator timed out, falling back to template");
                None
            }
        }
    };

    narrate(&NarratorInput {
        intent,
        played_san,
        legal_moves_san: &legal_moves_san,
        llm_text,
    })
}

/// Ranks candidate replies at `position` and runs one level of best-first
/// exploration over them. Candidate evals are already known from
/// `gather_candidates`, so the expansion closure does not recurse further;
/// deepening a specific line is a job for a follow-up exploration pass
/// seeded from this one's `explored_order`.
async fn explore_side_lines(
    position: &Position,
    criticality_score: f64,
    budget_mult: f64,
    config: &AnnotatorConfig,
    collaborators: &Collaborators,
    stop_flag: &Arc<AtomicBool>,
) -> Result<crate::explore::ExplorationOutcome> {
    let candidates = gather_candidates(position, config.target_rating, collaborators).await?;

    let mut seeds = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        if let Ok(next) = position.play_uci(&candidate.uci) {
            let cost = 1.0 / (1.0 + f64::from(candidate.source.priority()));
            seeds.push(ExplorationCandidate {
                position_key: next.key(),
                uci: candidate.uci.clone(),
                depth: 1,
                criticality: criticality_score,
                info_gain: if candidate.eval_cp.is_some() { 0.6 } else { 0.3 },
                novelty: 0.5,
                cost,
            });
        }
    }

    let budget = ExplorationBudget {
        max_nodes: ((EXPLORATION_MAX_NODES_FULL as f64) * budget_mult).max(1.0) as usize,
        max_depth: 1,
        time_budget: Duration::from_millis((EXPLORATION_TIME_BUDGET_MS_FULL as f64 * budget_mult) as u64),
    };
    let mut engine = ExplorationEngine::new(budget, Arc::clone(stop_flag));
    Ok(engine.explore(seeds, |_candidate| Vec::new()))
}

/// Gathers candidate side-line moves for `position` from the engine and the
/// human-move model, ranked by source priority, for use as exploration seeds.
pub async fn gather_candidates(position: &Position, target_rating: u32, collaborators: &Collaborators) -> Result<Vec<CandidateMove>> {
    let mut candidates = HashMap::new();

    let eval = collaborators.engine.evaluate_multi_pv(position, tier_defaults(Tier::Standard).depth, tier_defaults(Tier::Standard).multipv).await?;
    for line in &eval.lines {
        if let Some(uci) = line.moves_uci.first() {
            candidates.insert(
                uci.clone(),
                CandidateMove {
                    uci: uci.clone(),
                    source: CandidateSource::EngineTop,
                    eval_cp: Some(line.eval_cp),
                },
            );
        }
    }

    let human_moves = collaborators.human_model.predict(position, target_rating).await?;
    for uci in human_moves {
        candidates.entry(uci.clone()).or_insert(CandidateMove {
            uci,
            source: CandidateSource::HumanLikely,
            eval_cp: None,
        });
    }

    let mut result: Vec<_> = candidates.into_values().collect();
    result.sort_by_key(|c| std::cmp::Reverse(c.source.priority()));
    info!(count = result.len(), "gathered exploration candidates");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmptyOpeningDb, MockEngine, MockHumanMoveModel, NullLlmClient};

    fn collaborators() -> Collaborators {
        Collaborators {
            engine: Box::new(MockEngine),
            human_model: Box::new(MockHumanMoveModel { engine: MockEngine }),
            opening_db: Box::new(EmptyOpeningDb),
            llm: Box::new(NullLlmClient),
        }
    }

    #[tokio::test]
    async fn annotates_a_short_game_end_to_end() {
        let pgn_text = "[Event \"Test\"]\n[White \"A\"]\n[Black \"B\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *\n";
        let config = AnnotatorConfig {
            skip_llm: true,
            ..AnnotatorConfig::default()
        };
        let report = annotate_pgn(pgn_text, &config, &collaborators()).await.unwrap();
        assert!(report.rendered_pgn.contains("1. e4"));
        assert_eq!(report.dag_stats.node_count, 7);
    }

    #[test]
    fn exploration_worthy_skips_decisive_quiet_positions() {
        assert!(!exploration_worthy(320, Classification::Good, false));
        assert!(exploration_worthy(320, Classification::Good, true));
        assert!(exploration_worthy(100, Classification::Mistake, false));
    }

    #[test]
    fn budget_multiplier_is_bounded() {
        assert_eq!(budget_multiplier(0.0), 0.25);
        assert_eq!(budget_multiplier(100.0), 1.0);
    }
}
